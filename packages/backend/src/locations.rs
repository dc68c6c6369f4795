//! Approved location listings.

use std::path::PathBuf;

use cowork_map_location_models::LocationRecord;
use serde_json::Value;

use crate::{BackendConfig, BackendError, check_status};

/// Table query for approved listings with their company's display fields.
pub const LOCATIONS_QUERY: &str = "select=*,companies(name,logo_url)&status=eq.approved";

/// Reads location listings.
#[async_trait::async_trait]
pub trait LocationService: Send + Sync {
    /// Fetches every approved listing.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the query fails. Individual rows that
    /// cannot be decoded are dropped, not reported.
    async fn fetch_locations(&self) -> Result<Vec<LocationRecord>, BackendError>;
}

/// Queries the `locations` REST table.
pub struct HttpLocationService {
    client: reqwest::Client,
    url: String,
    anon_key: String,
}

impl HttpLocationService {
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: config.table_url("locations", LOCATIONS_QUERY),
            anon_key: config.anon_key.clone(),
        }
    }
}

#[async_trait::async_trait]
impl LocationService for HttpLocationService {
    async fn fetch_locations(&self) -> Result<Vec<LocationRecord>, BackendError> {
        let resp = self
            .client
            .get(&self.url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .send()
            .await?;
        let resp = check_status(resp, "locations query").await?;

        let rows: Vec<Value> = resp.json().await?;
        let total = rows.len();
        let records = parse_rows(rows);
        log::info!("Fetched {} of {total} location row(s)", records.len());

        Ok(records)
    }
}

/// Reads listings from a JSON file holding an array of rows.
pub struct FileLocationService {
    path: PathBuf,
}

impl FileLocationService {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl LocationService for FileLocationService {
    async fn fetch_locations(&self) -> Result<Vec<LocationRecord>, BackendError> {
        let body = std::fs::read_to_string(&self.path).map_err(|e| BackendError::Service {
            message: format!("Failed to read {}: {e}", self.path.display()),
        })?;
        let rows: Vec<Value> = serde_json::from_str(&body)?;
        Ok(parse_rows(rows))
    }
}

/// Serves listings held in memory.
pub struct StaticLocationService {
    records: Vec<LocationRecord>,
}

impl StaticLocationService {
    #[must_use]
    pub const fn new(records: Vec<LocationRecord>) -> Self {
        Self { records }
    }
}

#[async_trait::async_trait]
impl LocationService for StaticLocationService {
    async fn fetch_locations(&self) -> Result<Vec<LocationRecord>, BackendError> {
        Ok(self.records.clone())
    }
}

/// Decodes table rows, moving the embedded `companies` object into the
/// record's `company` field. Undecodable rows are dropped with a warning.
#[must_use]
pub fn parse_rows(rows: Vec<Value>) -> Vec<LocationRecord> {
    rows.into_iter()
        .filter_map(|mut row| {
            if let Some(obj) = row.as_object_mut() {
                if let Some(company) = obj.remove("companies") {
                    let company = match company {
                        Value::Array(items) => items.into_iter().next().unwrap_or(Value::Null),
                        other => other,
                    };
                    obj.insert("company".to_string(), company);
                }
            }

            let id = row.get("id").cloned();
            match serde_json::from_value::<LocationRecord>(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("Dropping location row {id:?}: {e}");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flattens_embedded_company() {
        let rows = vec![json!({
            "id": "a1",
            "name": "Sea Garden Desks",
            "city": "Варна",
            "latitude": 43.2,
            "longitude": "27.9",
            "status": "approved",
            "companies": { "name": "Seaside Cowork", "logo_url": "https://cdn.test/logo.png" }
        })];
        let records = parse_rows(rows);

        assert_eq!(records.len(), 1);
        let company = records[0].company.as_ref().unwrap();
        assert_eq!(company.name, "Seaside Cowork");
        assert_eq!(company.logo_url.as_deref(), Some("https://cdn.test/logo.png"));
        assert_eq!(records[0].position(), Some([27.9, 43.2]));
    }

    #[test]
    fn accepts_array_or_null_company() {
        let rows = vec![
            json!({ "id": "a", "name": "A", "companies": [{ "name": "Co" }] }),
            json!({ "id": "b", "name": "B", "companies": [] }),
            json!({ "id": "c", "name": "C", "companies": null }),
        ];
        let records = parse_rows(rows);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].company.as_ref().unwrap().name, "Co");
        assert!(records[1].company.is_none());
        assert!(records[2].company.is_none());
    }

    #[test]
    fn drops_undecodable_rows() {
        let rows = vec![
            json!({ "id": "ok", "name": "Fine" }),
            json!({ "id": 7, "name": "Numeric id" }),
            json!("not an object"),
        ];
        let records = parse_rows(rows);
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["ok"]);
    }

    #[test]
    fn query_embeds_company_and_filters_approved() {
        let config = BackendConfig {
            backend_url: "https://example.test".to_string(),
            anon_key: String::new(),
            boundaries_url: String::new(),
            fallback_token: String::new(),
        };
        let service = HttpLocationService::new(&config);
        assert_eq!(
            service.url,
            "https://example.test/rest/v1/locations?select=*,companies(name,logo_url)&status=eq.approved"
        );
    }
}
