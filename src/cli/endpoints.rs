//! Endpoints command implementation

use crate::cli::output::{format_endpoints_json, format_endpoints_table, EndpointView};
use crate::cli::serve::load_config;
use crate::cli::EndpointsArgs;

/// Handle `vigil endpoints`: list resolved endpoints without probing them.
pub fn handle_endpoints(args: &EndpointsArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config(&args.config)?;
    let endpoints = config.resolve_endpoints()?;

    // Convert to view models
    let views: Vec<EndpointView> = endpoints.iter().map(EndpointView::from).collect();

    if args.json {
        Ok(format_endpoints_json(&views)?)
    } else {
        Ok(format_endpoints_table(&views))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_endpoints_lists_resolved_urls() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(
            temp.path(),
            r#"
            [[endpoints]]
            name = "Report Service"
            url = "http://reports.internal:9000/health"
            "#,
        )
        .unwrap();

        let args = EndpointsArgs {
            json: true,
            config: temp.path().to_path_buf(),
        };
        let output = handle_endpoints(&args).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["endpoints"][0]["name"], "Report Service");
        assert_eq!(
            parsed["endpoints"][0]["url"],
            "http://reports.internal:9000/health"
        );
    }

    #[test]
    fn test_endpoints_invalid_url_is_error() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(
            temp.path(),
            "[[endpoints]]\nname = \"Broken\"\nurl = \"not a url\"\n",
        )
        .unwrap();

        let args = EndpointsArgs {
            json: false,
            config: temp.path().to_path_buf(),
        };
        assert!(handle_endpoints(&args).is_err());
    }
}
