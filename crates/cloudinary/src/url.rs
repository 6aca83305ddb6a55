use cirrus_core::AssetLocator;
use cirrus_store::DeliveryOptions;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::config::CloudinaryConfig;

/// Characters escaped in public IDs placed in a URL path. `/` is kept so
/// folder separators survive.
const PUBLIC_ID: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Escape a public ID or folder path for use in a URL path.
pub fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PUBLIC_ID).to_string()
}

/// Render the transformation segment for the options, in the order
/// `w_`, `h_`, `c_`, `q_`, `f_`, `g_`. Returns `None` when no
/// transformation is requested.
pub fn transformation(options: &DeliveryOptions) -> Option<String> {
    let parts: Vec<String> = [
        options.width.map(|w| format!("w_{w}")),
        options.height.map(|h| format!("h_{h}")),
        options.crop.as_ref().map(|c| format!("c_{c}")),
        options.quality.as_ref().map(|q| format!("q_{q}")),
        options.fetch_format.as_ref().map(|f| format!("f_{f}")),
        options.gravity.as_ref().map(|g| format!("g_{g}")),
    ]
    .into_iter()
    .flatten()
    .collect();

    (!parts.is_empty()).then(|| parts.join(","))
}

/// Build the delivery URL for an asset:
/// `{scheme}://{host}/{cloud}/{type}/upload/[{transformation}/][v{version}/]{public_id}[.{format}]`.
pub fn delivery_url(
    config: &CloudinaryConfig,
    locator: &AssetLocator,
    options: &DeliveryOptions,
) -> String {
    let scheme = if options.secure.unwrap_or(config.secure) {
        "https"
    } else {
        "http"
    };

    let mut url = format!(
        "{scheme}://{}/{}/{}/upload/",
        config.delivery_host, config.cloud_name, locator.category
    );
    if let Some(transformation) = transformation(options) {
        url.push_str(&transformation);
        url.push('/');
    }
    if let Some(version) = options.version {
        url.push_str(&format!("v{version}/"));
    }
    url.push_str(&encode_path(locator.identifier.trim_start_matches('/')));
    if let Some(format) = &options.format {
        url.push('.');
        url.push_str(format);
    }
    url
}
