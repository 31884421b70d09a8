use config::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub port: u16,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// Session token signing and lifetime settings
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub session_token_expiry: i64,  // seconds (e.g., 1200 for 20 minutes)
    pub refresh_token_expiry: i64,  // seconds (e.g., 604800 for 7 days)
    pub issuer: String,
}

impl JwtSettings {
    /// Startup-time check on the signing key.
    ///
    /// An empty secret must abort startup: a server with no signing key
    /// would hand out tokens nothing can verify.
    pub fn ensure_valid(&self) -> Result<(), ConfigError> {
        if self.secret.trim().is_empty() {
            return Err(ConfigError::Message(
                "jwt.secret must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .build()?;
    let settings = settings.try_deserialize::<Settings>()?;
    settings.jwt.ensure_valid()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt_settings(secret: &str) -> JwtSettings {
        JwtSettings {
            secret: secret.to_string(),
            session_token_expiry: 1200,
            refresh_token_expiry: 604800,
            issuer: "wayfarer".to_string(),
        }
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(jwt_settings("").ensure_valid().is_err());
        assert!(jwt_settings("   ").ensure_valid().is_err());
    }

    #[test]
    fn non_empty_secret_is_accepted() {
        assert!(jwt_settings("some-signing-key").ensure_valid().is_ok());
    }
}
