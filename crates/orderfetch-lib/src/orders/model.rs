use serde::{Deserialize, Deserializer, Serialize};

/// One order as written by the order-history exporter.
///
/// Only the fields needed to locate images are modelled; everything else the
/// exporter writes (`itemCount`, `total`, `url`, ...) is ignored.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub date_time: String,
    #[serde(default, deserialize_with = "non_empty")]
    pub delivery_photo_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<LineItem>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default, deserialize_with = "non_empty")]
    pub thumbnail_url: Option<String>,
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<LineItem>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<LineItem>>::deserialize(deserializer)?.unwrap_or_default())
}
