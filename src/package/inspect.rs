use std::fs::File;
use std::path::Path;

use colored::*;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};
use flate2::read::GzDecoder;
use tracing::info;

use super::types::{PackageError, REQUIRED_LAYOUT};

/// A member of a packaged archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    /// Archive-internal name of the entry
    pub name: String,
    /// Uncompressed size in bytes
    pub size: u64,
}

/// Reads the member list of a packaged archive, in archive order.
///
/// # Arguments
///
/// * `path` - Path to the gzip-compressed tar archive
///
/// # Returns
///
/// A Result containing the members or an error
pub fn read_members(path: &Path) -> Result<Vec<MemberInfo>, PackageError> {
    let file = File::open(path)?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));

    let mut members = Vec::new();
    for entry in archive.entries()? {
        let entry = entry?;
        members.push(MemberInfo {
            name: entry.path()?.to_string_lossy().into_owned(),
            size: entry.size(),
        });
    }

    Ok(members)
}

/// Checks an archive's member set against the required deployment layout.
///
/// # Returns
///
/// Ok(()) when the sets match exactly, otherwise a BadLayout error naming
/// the missing and unexpected entries
pub fn check_layout(members: &[MemberInfo]) -> Result<(), PackageError> {
    let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();

    let missing: Vec<String> = REQUIRED_LAYOUT
        .iter()
        .filter(|required| !names.contains(required))
        .map(|required| required.to_string())
        .collect();
    let extra: Vec<String> = names
        .iter()
        .filter(|name| !REQUIRED_LAYOUT.contains(name))
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() && extra.is_empty() {
        Ok(())
    } else {
        Err(PackageError::BadLayout { missing, extra })
    }
}

/// Prints a table of an archive's members and reports whether they match the
/// deployment layout. The report is observational; a mismatch is printed,
/// not corrected.
///
/// # Arguments
///
/// * `path` - Path to the gzip-compressed tar archive
pub fn print_contents(path: &Path) -> Result<(), PackageError> {
    let members = read_members(path)?;
    info!(archive = %path.display(), members = members.len(), "inspected archive");

    if members.is_empty() {
        println!("{}", "Archive contains no members".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table
        .set_header(vec![
            Cell::new("Entry").fg(comfy_table::Color::Cyan).add_attribute(Attribute::Bold),
            Cell::new("Size (bytes)").fg(comfy_table::Color::Cyan).add_attribute(Attribute::Bold),
        ])
        .load_preset(comfy_table::presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    for member in &members {
        table.add_row(vec![
            Cell::new(&member.name).fg(comfy_table::Color::Green),
            Cell::new(member.size.to_string())
                .fg(comfy_table::Color::White)
                .set_alignment(CellAlignment::Right),
        ]);
    }

    println!("\n{}", table);
    println!("{}", format!("Total members: {}", members.len()).bright_green());

    match check_layout(&members) {
        Ok(()) => println!("{}", "✓ Layout matches the deployment contract".green()),
        Err(e) => println!("{}", format!("✗ {}", e).red()),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(name: &str) -> MemberInfo {
        MemberInfo {
            name: name.to_string(),
            size: 0,
        }
    }

    #[test]
    fn full_layout_passes() {
        let members: Vec<MemberInfo> = REQUIRED_LAYOUT.iter().map(|&n| member(n)).collect();
        assert!(check_layout(&members).is_ok());
    }

    #[test]
    fn missing_entry_is_reported() {
        let members = vec![
            member("model.pth"),
            member("code/inference.py"),
            member("code/models.py"),
        ];

        match check_layout(&members).unwrap_err() {
            PackageError::BadLayout { missing, extra } => {
                assert_eq!(missing, vec!["code/requirements.txt".to_string()]);
                assert!(extra.is_empty());
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn foreign_entry_is_reported() {
        let mut members: Vec<MemberInfo> = REQUIRED_LAYOUT.iter().map(|&n| member(n)).collect();
        members.push(member("code/__pycache__/models.cpython-311.pyc"));

        match check_layout(&members).unwrap_err() {
            PackageError::BadLayout { missing, extra } => {
                assert!(missing.is_empty());
                assert_eq!(extra.len(), 1);
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
