//! Offline handlers: read the local copies without contacting the device.

use pductl_config::Config;
use pductl_core::{ConfigStore, FileStore, decode_bytes};

use crate::cli::{GetArgs, GlobalOpts, ShowArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

pub fn show(args: &ShowArgs, global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    let address = config::active_address(global, cfg)?;
    let store = FileStore::open(config::cache_dir(global, cfg))?;

    let bytes = if args.pending {
        store.read_pending(address)?
    } else {
        store.read_cached(address)?
    };
    let doc = decode_bytes(&bytes).map_err(|source| CliError::Format { source })?;

    output::print_output(&output::render_document(global.output, &doc)?);
    Ok(())
}

pub fn get(args: &GetArgs, global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    let address = config::active_address(global, cfg)?;
    let store = FileStore::open(config::cache_dir(global, cfg))?;

    let doc = decode_bytes(&store.read_cached(address)?)
        .map_err(|source| CliError::Format { source })?;
    let value = doc
        .get(&args.setting.section, &args.setting.key)
        .ok_or_else(|| CliError::SettingNotFound {
            setting: args.setting.to_string(),
        })?;

    output::print_output(&output::render_value(global.output, value)?);
    Ok(())
}
