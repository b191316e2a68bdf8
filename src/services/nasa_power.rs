//! NASA POWER climatology client.
//!
//! Fetches the long-term monthly means of daily maximum (`T2M_MAX`) and
//! minimum (`T2M_MIN`) 2 m air temperature at a point.
//!
//! See <https://power.larc.nasa.gov/docs/services/api/temporal/climatology/>

use async_trait::async_trait;
use std::time::Duration;

use crate::config::ClimateSettings;
use crate::error::{ProcessingError, Result};
use crate::models::TemperatureClimatology;
use crate::services::ClimatologyService;
use crate::utils::constants::{MONTH_COLUMNS, POWER_FILL_VALUE};

const SERVICE: &str = "NASA POWER";
const PARAMETERS: &str = "T2M_MAX,T2M_MIN";

pub struct NasaPowerClient {
    client: reqwest::Client,
    base_url: String,
    community: String,
    timeout: Duration,
}

impl NasaPowerClient {
    pub fn new(settings: &ClimateSettings) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            community: settings.community.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        })
    }
}

#[async_trait]
impl ClimatologyService for NasaPowerClient {
    async fn temperature_climatology(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<TemperatureClimatology> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("parameters", PARAMETERS.to_string()),
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("community", self.community.clone()),
                ("format", "JSON".to_string()),
            ])
            .timeout(self.timeout)
            .send()
            .await?;

        let body: serde_json::Value = resp.error_for_status()?.json().await?;
        parse_climatology(&body)
    }
}

fn parse_climatology(body: &serde_json::Value) -> Result<TemperatureClimatology> {
    let parameters = &body["properties"]["parameter"];
    Ok(TemperatureClimatology::new(
        monthly_series(parameters, "T2M_MAX")?,
        monthly_series(parameters, "T2M_MIN")?,
    ))
}

/// Pull JAN..DEC out of a parameter block. The annual `ANN` key is ignored.
fn monthly_series(parameters: &serde_json::Value, name: &str) -> Result<Vec<f64>> {
    let series = parameters[name]
        .as_object()
        .ok_or_else(|| ProcessingError::service(SERVICE, format!("missing {} in response", name)))?;

    MONTH_COLUMNS
        .iter()
        .map(|month| {
            let value = series
                .get(*month)
                .and_then(|v| v.as_f64())
                .ok_or_else(|| {
                    ProcessingError::service(SERVICE, format!("missing {} {} value", name, month))
                })?;

            if value <= POWER_FILL_VALUE {
                return Err(ProcessingError::service(
                    SERVICE,
                    format!("{} {} is a fill value ({})", name, month, value),
                ));
            }
            Ok(value)
        })
        .collect()
}
