//! Current weather conditions from wttr.in.

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use crate::tools::{ParamType, ParameterSpec, Tool, ToolArgs, ToolError, ToolSpec};

const WTTR_URL: &str = "https://wttr.in/";

// Subset of the wttr.in `format=j1` document.

#[derive(Debug, Deserialize)]
struct WeatherReport {
    #[serde(default)]
    current_condition: Vec<CurrentCondition>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentCondition {
    #[serde(rename = "temp_C")]
    temp_c: String,
    #[serde(rename = "FeelsLikeC")]
    feels_like_c: String,
    humidity: String,
    #[serde(default)]
    weather_desc: Vec<TextValue>,
    #[serde(default)]
    windspeed_kmph: String,
    #[serde(default, rename = "winddir16Point")]
    wind_dir: String,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    value: String,
}

/// Current weather for a city, via wttr.in.
#[derive(Debug)]
pub struct QueryWeather {
    spec: ToolSpec,
    client: reqwest::Client,
}

impl QueryWeather {
    pub fn new(client: reqwest::Client) -> Self {
        let spec = ToolSpec::new(
            "query_weather",
            "Weather Query",
            "A tool for looking up the current weather in a specific city. Both the city and \
             the province names are required.",
        )
        .param(ParameterSpec::required(
            "city",
            ParamType::String,
            "Name of the city to look up, e.g. \"Chengdu\"",
        ))
        .param(ParameterSpec::required(
            "province",
            ParamType::String,
            "Province the city belongs to, e.g. \"Sichuan\"",
        ));

        Self { spec, client }
    }
}

fn location(city: &str, province: &str) -> String {
    if province.is_empty() {
        city.to_string()
    } else {
        format!("{city},{province}")
    }
}

fn request_url(city: &str, province: &str) -> Result<Url, ToolError> {
    let mut url = Url::parse(WTTR_URL)
        .map_err(|e| ToolError::Execution(format!("invalid weather url: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| ToolError::Execution("weather url cannot have a path".into()))?
        .clear()
        .push(&location(city, province));
    url.query_pairs_mut().append_pair("format", "j1");
    Ok(url)
}

fn summarize(city: &str, province: &str, report: WeatherReport) -> Result<String, ToolError> {
    let current = report
        .current_condition
        .into_iter()
        .next()
        .ok_or_else(|| ToolError::Execution(format!("no weather data for {city}")))?;

    let description = current
        .weather_desc
        .into_iter()
        .map(|d| d.value.trim().to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let place = location(city, province).replace(',', ", ");
    let mut summary = format!(
        "{place}: {description}, {}°C (feels like {}°C), humidity {}%",
        current.temp_c, current.feels_like_c, current.humidity
    );
    if !current.windspeed_kmph.is_empty() {
        summary.push_str(&format!(
            ", wind {} km/h {}",
            current.windspeed_kmph, current.wind_dir
        ));
    }
    Ok(summary.trim_end().to_string())
}

#[async_trait]
impl Tool for QueryWeather {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn call(&self, args: ToolArgs) -> Result<String, ToolError> {
        let field = |name: &str| {
            args.get(name)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .trim()
                .to_string()
        };
        let city = field("city");
        let province = field("province");
        let url = request_url(&city, &province)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ToolError::Execution(format!("weather request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(ToolError::Execution(format!(
                "weather service returned {status} for {city}"
            )));
        }

        let report: WeatherReport = response
            .json()
            .await
            .map_err(|e| ToolError::Execution(format!("invalid weather response: {e}")))?;

        summarize(&city, &province, report)
    }
}
