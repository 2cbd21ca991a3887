use figment::Jail;
use land_audit::config::AppConfig;
use land_audit::error::ConfigError;
use land_audit::grading::Provider;
use pretty_assertions::assert_eq;

#[test]
fn defaults_without_any_source() {
    Jail::expect_with(|_jail| {
        let config: AppConfig = AppConfig::figment_with(None).extract()?;
        assert_eq!(config, AppConfig::default());
        Ok(())
    });
}

#[test]
fn local_file_overrides_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "land-audit.toml",
            r#"
                [defaults]
                d0 = 12.0
                legal_max_far = 7.0

                [finance]
                discount_rate = 0.05
                lease_term_years = 50

                [grading]
                provider = "anthropic"
                anthropic_model = "claude-test"
            "#,
        )?;

        let config: AppConfig = AppConfig::figment_with(None).extract()?;
        assert_eq!(config.defaults.d0, 12.0);
        assert_eq!(config.defaults.g, 0.1);
        assert_eq!(config.defaults.parameters().legal_max_far, Some(7.0));
        assert_eq!(config.finance.discount_rate, 0.05);
        assert_eq!(config.finance.lease_term_years, 50);
        assert_eq!(config.finance.escalation_interval_years, 5);
        assert_eq!(config.grading.provider, Provider::Anthropic);
        assert_eq!(
            config.grading.model_for(Provider::Anthropic),
            Some("claude-test")
        );
        Ok(())
    });
}

#[test]
fn environment_beats_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "land-audit.toml",
            r#"
                [grading]
                provider = "openai"
                timeout_secs = 10
            "#,
        )?;
        jail.set_env("LAND_AUDIT_GRADING__PROVIDER", "gemini");
        jail.set_env("LAND_AUDIT_FINANCE__ROA_TARGET", "0.04");
        jail.set_env("LAND_AUDIT_GENERAL__REPORT_DIR", "reports");

        let config: AppConfig = AppConfig::figment_with(None).extract()?;
        assert_eq!(config.grading.provider, Provider::Gemini);
        assert_eq!(config.grading.timeout_secs, 10);
        assert_eq!(config.finance.roa_target, 0.04);
        assert_eq!(
            config.general.report_dir.as_deref(),
            Some(std::path::Path::new("reports"))
        );
        Ok(())
    });
}

#[test]
fn load_rejects_invalid_values() {
    Jail::expect_with(|jail| {
        jail.set_env("LAND_AUDIT_FINANCE__LEASE_TERM_YEARS", "0");

        let err = AppConfig::load_with(None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        Ok(())
    });
}

#[test]
fn load_reports_malformed_file() {
    Jail::expect_with(|jail| {
        jail.create_file("land-audit.toml", "[finance]\ndiscount_rate = \"high\"\n")?;

        let err = AppConfig::load_with(None).unwrap_err();
        assert!(matches!(err, ConfigError::Figment(_)));
        Ok(())
    });
}

#[test]
fn local_file_beats_user_file() {
    Jail::expect_with(|jail| {
        let user_file = jail.directory().join("user-config.toml");
        jail.create_file(
            "user-config.toml",
            r#"
                [grading]
                provider = "gemini"
                gemini_endpoint = "http://proxy.local/gemini"
                timeout_secs = 5
            "#,
        )?;
        jail.create_file("land-audit.toml", "[grading]\ntimeout_secs = 20\n")?;

        let config: AppConfig = AppConfig::figment_with(Some(user_file)).extract()?;
        assert_eq!(config.grading.provider, Provider::Gemini);
        assert_eq!(config.grading.timeout_secs, 20);
        assert_eq!(
            config.grading.endpoint_for(Provider::Gemini),
            Some("http://proxy.local/gemini")
        );
        assert_eq!(config.grading.endpoint_for(Provider::OpenAi), None);
        Ok(())
    });
}

#[test]
fn load_rejects_nan_gradient() {
    Jail::expect_with(|jail| {
        jail.create_file("land-audit.toml", "[defaults]\ng = nan\n")?;

        let err = AppConfig::load_with(None).unwrap_err();
        assert!(
            matches!(&err, ConfigError::InvalidValue { field, .. } if field == "defaults.g"),
            "unexpected error: {err}"
        );
        Ok(())
    });
}
