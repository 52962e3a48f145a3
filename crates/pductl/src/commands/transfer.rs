//! Online handlers: fetch from and push to the device.
//!
//! Each invocation opens one session, runs its transfers, and closes the
//! session again even when a transfer failed.

use std::sync::Arc;

use tracing::{debug, warn};

use pductl_api::FtpTransport;
use pductl_config::Config;
use pductl_core::{ConfigDocument, CoreError, FileStore, Pdu};

use crate::cli::{GlobalOpts, SetArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

type FtpPdu = Pdu<FtpTransport, FileStore>;

fn open_pdu(global: &GlobalOpts, cfg: &Config) -> Result<FtpPdu, CliError> {
    let target = config::resolve_target(global, cfg)?;
    let store = FileStore::open(config::cache_dir(global, cfg))?;
    debug!(device = %target.name, cache = %store.dir().display(), "opening device");

    Ok(Pdu::new(
        target.device,
        Arc::new(FtpTransport::new(target.transport)),
        Arc::new(store),
    )
    .with_settings(target.settings))
}

/// Close the session, reporting a close failure only if nothing else failed.
async fn finish<R>(pdu: &FtpPdu, result: Result<R, CoreError>) -> Result<R, CliError> {
    let closed = pdu.close().await;
    let value = result?;
    if let Err(err) = closed {
        warn!(error = %err, "session did not close cleanly");
    }
    Ok(value)
}

pub async fn fetch(global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    let pdu = open_pdu(global, cfg)?;
    pdu.connect().await?;

    let doc = finish(&pdu, pdu.fetch().await).await?;

    output::print_output(&output::render_document(global.output, &doc)?);
    Ok(())
}

pub async fn set(args: &SetArgs, global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    let pdu = open_pdu(global, cfg)?;
    pdu.connect().await?;

    let result = fetch_apply_push(&pdu, args).await;
    let (changed, pushed_at) = finish(&pdu, result).await?;

    eprintln!(
        "Pushed {changed} change(s) to {} at {}.",
        pdu.device().address(),
        pushed_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    eprintln!(
        "The device applies uploaded configuration on its own schedule, usually within a few \
         minutes. Avoid pushing again before then."
    );
    Ok(())
}

async fn fetch_apply_push(
    pdu: &FtpPdu,
    args: &SetArgs,
) -> Result<(usize, chrono::DateTime<chrono::Utc>), CoreError> {
    let mut doc: ConfigDocument = pdu.fetch().await?;

    let mut changed = 0;
    for assignment in &args.assignments {
        let path = &assignment.path;
        let previous = doc.set(&path.section, path.key.clone(), assignment.value.clone());
        if previous.as_deref() != Some(assignment.value.as_str()) {
            debug!(setting = %path, value = %assignment.value, "setting changed");
            changed += 1;
        }
    }

    let pushed_at = pdu.push(&doc).await?;
    Ok((changed, pushed_at))
}
