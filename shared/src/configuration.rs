use crate::error::ProxyError;
use lambda_http::tracing;
use serde::Serialize;
use std::env;

const DEFAULT_TABLE_BANK_SOAL: &str = "bank_soal";
const DEFAULT_TABLE_UJIAN: &str = "ujian";
const DEFAULT_TABLE_DATA: &str = "data";

/// Table names used by the front-end, keyed by their logical role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableNames {
    pub bank_soal: String,
    pub ujian: String,
    pub data: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            bank_soal: DEFAULT_TABLE_BANK_SOAL.to_string(),
            ujian: DEFAULT_TABLE_UJIAN.to_string(),
            data: DEFAULT_TABLE_DATA.to_string(),
        }
    }
}

/// Connection settings for the NocoDB API.
///
/// Deliberately not `Serialize`: the token must only ever leave the process as the
/// `xc-token` header of an upstream request. Use [`ApiConfig::public_view`] for
/// anything sent back to a browser.
#[derive(Clone, Default)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub api_token: Option<String>,
    pub project_id: Option<String>,
    pub tables: TableNames,
}

/// The part of [`ApiConfig`] a browser is allowed to see.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub tables: TableNames,
}

/// Base URL and token, both known to be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credentials<'a> {
    pub base_url: &'a str,
    pub api_token: &'a str,
}

impl ApiConfig {
    /// Reads the `NOCODB_*` variables verbatim. Empty table names fall back to
    /// their defaults; empty URL or project id are kept as set.
    pub fn load() -> Self {
        Self {
            base_url: env::var("NOCODB_URL").ok(),
            api_token: env::var("NOCODB_TOKEN").ok(),
            project_id: env::var("NOCODB_PROJECT_ID").ok(),
            tables: TableNames {
                bank_soal: table_name("NOCODB_TABLE_BANK_SOAL", DEFAULT_TABLE_BANK_SOAL),
                ujian: table_name("NOCODB_TABLE_UJIAN", DEFAULT_TABLE_UJIAN),
                data: table_name("NOCODB_TABLE_DATA", DEFAULT_TABLE_DATA),
            },
        }
    }

    pub fn log_presence(&self) {
        tracing::info!(
            has_url = is_set(&self.base_url),
            has_token = is_set(&self.api_token),
            has_project_id = is_set(&self.project_id),
            "NocoDB config loaded"
        );
    }

    pub fn credentials(&self) -> Result<Credentials<'_>, ProxyError> {
        match (non_empty(&self.base_url), non_empty(&self.api_token)) {
            (Some(base_url), Some(api_token)) => Ok(Credentials {
                base_url,
                api_token,
            }),
            _ => Err(ProxyError::MissingConfiguration),
        }
    }

    pub fn public_view(&self) -> PublicConfig {
        PublicConfig {
            base_url: self.base_url.clone(),
            project_id: self.project_id.clone(),
            tables: self.tables.clone(),
        }
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("project_id", &self.project_id)
            .field("tables", &self.tables)
            .finish()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn is_set(value: &Option<String>) -> bool {
    non_empty(value).is_some()
}

fn table_name(variable: &str, default: &str) -> String {
    env::var(variable)
        .ok()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::{ApiConfig, TableNames};
    use crate::error::ProxyError;

    #[test]
    fn when_all_variables_set_should_load() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("NOCODB_URL", "https://db.example.com/api/v2/tables/");
            jail.set_env("NOCODB_TOKEN", "secret-token");
            jail.set_env("NOCODB_PROJECT_ID", "p_school");
            jail.set_env("NOCODB_TABLE_BANK_SOAL", "m1");
            jail.set_env("NOCODB_TABLE_UJIAN", "m2");
            jail.set_env("NOCODB_TABLE_DATA", "m3");

            let config = ApiConfig::load();

            assert_eq!(
                config.base_url.as_deref(),
                Some("https://db.example.com/api/v2/tables/")
            );
            assert_eq!(config.api_token.as_deref(), Some("secret-token"));
            assert_eq!(config.project_id.as_deref(), Some("p_school"));
            assert_eq!(
                config.tables,
                TableNames {
                    bank_soal: "m1".into(),
                    ujian: "m2".into(),
                    data: "m3".into(),
                }
            );

            Ok(())
        });
    }

    #[test]
    fn when_tables_not_set_should_use_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("NOCODB_URL", "https://db.example.com/");
            jail.set_env("NOCODB_TABLE_UJIAN", "");

            let config = ApiConfig::load();

            assert_eq!(config.tables, TableNames::default());
            assert_eq!(config.tables.ujian, "ujian");
            assert!(config.api_token.is_none());
            assert!(config.project_id.is_none());

            Ok(())
        });
    }

    #[test]
    fn when_project_id_is_numeric_should_keep_it_as_text() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("NOCODB_PROJECT_ID", "12345");

            let config = ApiConfig::load();

            assert_eq!(config.project_id.as_deref(), Some("12345"));

            Ok(())
        });
    }

    #[test]
    fn when_values_look_numeric_or_bracketed_should_keep_them_verbatim() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("NOCODB_URL", "https://db.example.com/");
            jail.set_env("NOCODB_TOKEN", "[abc]");
            jail.set_env("NOCODB_PROJECT_ID", "007");
            jail.set_env("NOCODB_TABLE_DATA", "1.50");
            jail.set_env("NOCODB_TABLE_UJIAN", "true");

            let config = ApiConfig::load();

            assert_eq!(config.api_token.as_deref(), Some("[abc]"));
            assert_eq!(config.project_id.as_deref(), Some("007"));
            assert_eq!(config.tables.data, "1.50");
            assert_eq!(config.tables.ujian, "true");
            assert_eq!(config.credentials().unwrap().api_token, "[abc]");

            Ok(())
        });
    }

    #[test]
    fn when_url_and_project_id_empty_should_still_be_public() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("NOCODB_URL", "");
            jail.set_env("NOCODB_TOKEN", "secret-token");
            jail.set_env("NOCODB_PROJECT_ID", "");

            let config = ApiConfig::load();

            assert_eq!(
                serde_json::to_value(config.public_view()).unwrap(),
                serde_json::json!({
                    "baseUrl": "",
                    "projectId": "",
                    "tables": { "bank_soal": "bank_soal", "ujian": "ujian", "data": "data" }
                })
            );
            assert!(matches!(
                config.credentials(),
                Err(ProxyError::MissingConfiguration)
            ));

            Ok(())
        });
    }

    #[test]
    fn when_token_missing_credentials_should_fail() {
        let config = ApiConfig {
            base_url: Some("https://db.example.com/".into()),
            ..Default::default()
        };

        assert!(matches!(
            config.credentials(),
            Err(ProxyError::MissingConfiguration)
        ));
    }

    #[test]
    fn public_view_should_never_contain_token() {
        let config = ApiConfig {
            base_url: Some("https://db.example.com/".into()),
            api_token: Some("secret-token".into()),
            project_id: None,
            tables: TableNames::default(),
        };

        let json = serde_json::to_value(config.public_view()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "baseUrl": "https://db.example.com/",
                "tables": { "bank_soal": "bank_soal", "ujian": "ujian", "data": "data" }
            })
        );
        assert!(!json.to_string().contains("secret-token"));
        assert!(!format!("{:?}", config).contains("secret-token"));
    }
}
