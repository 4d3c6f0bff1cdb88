//! Output locations of a run
//!
//! Checks for an existing report and image directory, asking before anything
//! gets overwritten, and creates the directories a run writes into.

use crate::prompt::Confirm;
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

pub const REPORT_EXISTS_PROMPT: &str = "ATTENTION: File of this name already exists and it will be overwritten\nDo you want to continue? [y/n]";

pub const DIRECTORY_EXISTS_PROMPT: &str = "ATTENTION: Directory of this name already exists and it may contain files that will be overwritten\nDo you want to continue? [y/n]";

pub const STOPPED_MESSAGE: &str = "Program has been stopped by the user.";

/// Whether a run may proceed past an output check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proceed {
    Yes,
    Declined,
}

/// Asks before overwriting an existing report file
pub fn check_report_path(report_path: &Path, confirm: &mut dyn Confirm) -> io::Result<Proceed> {
    if report_path.is_file() && !confirm.confirm(REPORT_EXISTS_PROMPT)? {
        println!("{STOPPED_MESSAGE}");
        return Ok(Proceed::Declined);
    }
    Ok(Proceed::Yes)
}

/// Creates the image directory of a run, asking first if it already exists
pub fn prepare_image_dir(image_dir: &Path, confirm: &mut dyn Confirm) -> io::Result<Proceed> {
    if image_dir.is_dir() {
        if !confirm.confirm(DIRECTORY_EXISTS_PROMPT)? {
            println!("{STOPPED_MESSAGE}");
            return Ok(Proceed::Declined);
        }
        return Ok(Proceed::Yes);
    }

    fs::create_dir_all(image_dir)?;
    debug!(path = %image_dir.display(), "created image directory");
    Ok(Proceed::Yes)
}

/// Creates the directory the report is written into
pub fn prepare_results_dir(results_dir: &Path) -> io::Result<()> {
    if !results_dir.is_dir() {
        fs::create_dir_all(results_dir)?;
        debug!(path = %results_dir.display(), "created results directory");
    }
    Ok(())
}
