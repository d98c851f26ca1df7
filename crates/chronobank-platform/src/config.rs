use anyhow::{Context, Result};

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub database_url: String,
    pub http_addr: String,
}

impl ServiceConfig {
    pub fn from_env(default_http_addr: &str) -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is required")?;
        let http_addr =
            std::env::var("HTTP_ADDR").unwrap_or_else(|_| default_http_addr.to_string());

        Ok(Self {
            database_url,
            http_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::ServiceConfig;

    #[test]
    fn http_addr_falls_back_to_default() {
        // SAFETY: tests in this module are the only env mutators here.
        unsafe {
            std::env::set_var("DATABASE_URL", "postgres://localhost/chronobank");
            std::env::remove_var("HTTP_ADDR");
        }
        let config = ServiceConfig::from_env("0.0.0.0:8080").unwrap();
        assert_eq!(config.http_addr, "0.0.0.0:8080");
        assert_eq!(config.database_url, "postgres://localhost/chronobank");
    }
}
