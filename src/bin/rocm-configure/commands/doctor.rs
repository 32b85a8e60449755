//! `rocm-configure doctor` command

use anyhow::Result;

use crate::commands::GlobalArgs;
use rocm_configure::ops::{doctor, format_report};

pub fn execute(global: &GlobalArgs) -> Result<()> {
    let (_, host) = global.detect_host()?;
    let report = doctor(&host);

    print!("{}", format_report(&report, global.verbose));

    // Exit with error code if required checks failed
    if !report.all_required_passed() {
        std::process::exit(1);
    }

    Ok(())
}
