//! `smux version`: the server's version banner.

use serde::Serialize;
use smux_api::{ApiClient, VersionInfo};
use smux_core::dashboard::banner_text;

use crate::cli::GlobalOpts;
use crate::output;

use super::Failure;

#[derive(Serialize)]
struct VersionOut<'a> {
    #[serde(flatten)]
    info: &'a VersionInfo,
    banner: String,
}

pub async fn handle(client: &ApiClient, global: &GlobalOpts) -> Result<(), Failure> {
    let info = client.version().await?;
    tracing::debug!(version = %info.version, "fetched server version");

    let out = VersionOut {
        banner: banner_text(&info),
        info: &info,
    };
    let rendered = output::render_single(
        global.output,
        &out,
        |v| v.banner.clone(),
        |v| v.info.version.clone(),
    )?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}
