use crate::config::{default_api_url, DashboardConfig, UrlSource};
use crate::version::{API_VERSION, VERSION};

fn source_label(source: UrlSource) -> &'static str {
    match source {
        UrlSource::Default => "default",
        UrlSource::File => "saved preference",
        UrlSource::Environment => "FARMVIBES_API_URL",
        UrlSource::CommandLine => "--api-url",
    }
}

pub fn render_settings(config: &DashboardConfig) -> String {
    let mut lines = vec![
        "Settings".to_string(),
        format!("API URL:        {}", config.api_url),
        format!("Source:         {}", source_label(config.api_url_source)),
        format!("Default URL:    {}", default_api_url()),
    ];
    if config.api_url_source.is_fixed() {
        lines.push(
            "The API URL is fixed for this invocation; `settings set-url` only changes the saved preference."
                .to_string(),
        );
    }
    lines.extend([
        format!("Config file:    {}", config.config_path.display()),
        format!("Log directory:  {}", config.log_dir),
        format!("Timeout:        {}s", config.request_timeout_secs),
        String::new(),
        "Environment Information".to_string(),
        format!("Dashboard Version: {VERSION}"),
        format!("API Version:       {API_VERSION}"),
        format!(
            "Environment:       {}",
            if cfg!(debug_assertions) { "development" } else { "production" }
        ),
    ]);
    lines.join("\n")
}
