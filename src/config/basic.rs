use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::net::{IpAddr, Ipv4Addr};

/// Default IP address for the HTTP server listen address.
pub(super) fn default_listen_ip() -> IpAddr {
    Ipv4Addr::new(0, 0, 0, 0).into()
}

/// Default port for the HTTP server.
pub(super) fn default_port() -> u16 {
    3000
}

/// Env values are type-sniffed by Figment, so a numeric-looking key arrives as a number.
pub(super) fn deserialize_opt_string_lax<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;

    match v {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(serde::de::Error::custom(
            "expected a string or a number for gemini_api_key",
        )),
    }
}

/// Accepts the service-account blob either verbatim or already parsed into a table.
pub(super) fn deserialize_opt_json_lax<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;

    match v {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other @ Value::Object(_)) => serde_json::to_string(&other)
            .map(Some)
            .map_err(serde::de::Error::custom),
        Some(_) => Err(serde::de::Error::custom(
            "expected a JSON string or table for google_service_account_json",
        )),
    }
}

/// Accepts `["a", "b"]` as well as `"a,b"`; blank entries are dropped.
pub(super) fn deserialize_list_lax<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;

    let items: Vec<String> = match v {
        Value::String(s) => s.split(',').map(str::to_string).collect(),
        Value::Array(values) => values
            .into_iter()
            .map(|value| match value {
                Value::String(s) => Ok(s),
                other => Err(serde::de::Error::custom(format!(
                    "expected model names as strings, got {other}"
                ))),
            })
            .collect::<Result<_, _>>()?,
        _ => {
            return Err(serde::de::Error::custom(
                "expected a list or a comma-separated string for models",
            ));
        }
    };

    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}
