//! Chip database maintenance commands

use std::fs;
use std::path::Path;

use norprog_core::chip::{codec, DbLoad, ParamSet, SpiNorDb, SpiNorParam, MANDATORY_FIELDS};
use norprog_core::ParamError;

/// Report malformed records
pub fn check_db(
    path: &Path,
    load: &DbLoad<SpiNorParam>,
    strict: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    for e in &load.errors {
        println!("{}:{}", path.display(), e);
    }
    println!(
        "{}: {} chips loaded, {} records skipped",
        path.display(),
        load.db.len(),
        load.errors.len()
    );

    if strict && !load.is_clean() {
        return Err(format!("{} malformed records", load.errors.len()).into());
    }
    Ok(())
}

/// Write the database in canonical form
pub fn normalize_db(
    load: &DbLoad<SpiNorParam>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    if !load.is_clean() {
        log::warn!(
            "{} malformed records are left out of the output",
            load.errors.len()
        );
    }

    let text = load.db.to_text();
    match output {
        Some(path) => {
            fs::write(path, &text)?;
            println!("Wrote {} chips to {}", load.db.len(), path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}

/// Change one field of a chip and save the database
pub fn set_param(
    db_path: &Path,
    load: DbLoad<SpiNorParam>,
    chip_name: &str,
    param: &str,
    value: &str,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let target = output.unwrap_or(db_path);
    check_writable(&load, db_path, target)?;

    let mut db = load.db;
    let line = apply_edit(&mut db, chip_name, param, value)?;
    log::info!("{}", line);

    fs::write(target, db.to_text())?;
    println!("Saved {}", target.display());
    Ok(())
}

/// Rewriting the loaded file would drop the records that did not load
fn check_writable(
    load: &DbLoad<SpiNorParam>,
    db_path: &Path,
    target: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    if !load.is_clean() && target == db_path {
        return Err(format!(
            "{} has {} malformed records; fix them first (see check-db) or use --output",
            db_path.display(),
            load.errors.len()
        )
        .into());
    }
    Ok(())
}

/// Set one field of a chip; the database is unchanged on error
///
/// Returns the edited record line.
fn apply_edit(
    db: &mut SpiNorDb,
    chip_name: &str,
    param: &str,
    value: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    let index = db
        .position_by_name(chip_name)
        .ok_or_else(|| format!("Chip '{}' is not in the database", chip_name))?;
    let mut chip = db
        .get(index)
        .ok_or_else(|| format!("Chip '{}' is not in the database", chip_name))?
        .clone();

    let invalid = |e: ParamError| format!("Invalid value '{}' for {}: {}", value, param, e);
    match param {
        "name" => {
            chip.set_name(value)?;
            if db
                .position_by_name(chip.name())
                .is_some_and(|other| other != index)
            {
                return Err(format!("Duplicate chip name '{}'", chip.name()).into());
            }
        }
        "page_size" => chip.set_page_size(codec::decode(value).map_err(invalid)?),
        "block_size" => chip.set_block_size(codec::decode(value).map_err(invalid)?),
        "total_size" => chip.set_total_size(codec::decode(value).map_err(invalid)?),
        _ => {
            let role = SpiNorParam::from_name(param).ok_or_else(|| {
                let mut names: Vec<&str> = MANDATORY_FIELDS.to_vec();
                names.extend(SpiNorParam::ALL.iter().map(|p| p.name()));
                format!("Unknown parameter '{}' (expected one of: {})", param, names.join(", "))
            })?;
            chip.set_param(role, codec::decode_optional(value).map_err(invalid)?);
        }
    }

    let line = chip.to_line();
    let slot = db
        .get_mut(index)
        .ok_or_else(|| format!("Chip '{}' is not in the database", chip_name))?;
    *slot = chip;
    Ok(line)
}

/// Look up ID bytes in the database
pub fn match_id(db: &SpiNorDb, id: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
    let shown = id
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ");

    match db.find_index_by_prefix(id) {
        Some(index) => {
            let chip = db
                .get(index)
                .ok_or_else(|| format!("Chip #{} disappeared", index))?;
            println!("{} matches #{}: {}", shown, index, chip.name());
            Ok(())
        }
        None => Err(format!("No chip matches {}", shown).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DB: &str = "\
W25Q32, 256, 65536, 4194304, 0xEF, 0x40, 0x16, -, -, -, 0x08, 0x0B, 0x9F, 0x02, 0x06, 0xD8, 0x05, 0x00, 0x01, -
W25Q64, 256, 65536, 8388608, 0xEF, 0x40, 0x17, -, -, -, 0x08, 0x0B, 0x9F, 0x02, 0x06, 0xD8, 0x05, 0x00, 0x01, -
";

    fn db() -> SpiNorDb {
        SpiNorDb::load(DB).into_strict().unwrap()
    }

    #[test]
    fn test_edit_optional_param() {
        let mut db = db();
        let line = apply_edit(&mut db, "W25Q64", "read_cmd", "0x03").unwrap();
        assert!(line.starts_with("W25Q64, 256,"));
        assert_eq!(db.param(1, SpiNorParam::ReadCmd), Some(Some(0x03)));

        apply_edit(&mut db, "W25Q64", "freq", "-").unwrap();
        assert_eq!(db.param(1, SpiNorParam::Frequency), Some(None));

        apply_edit(&mut db, "W25Q64", "total_size", "0x1000000").unwrap();
        assert_eq!(db.find_by_name("W25Q64").unwrap().total_size(), 16 << 20);
    }

    #[test]
    fn test_rename() {
        let mut db = db();
        apply_edit(&mut db, "W25Q64", "name", "W25Q64JV").unwrap();
        assert!(db.find_by_name("W25Q64").is_none());
        assert_eq!(db.position_by_name("W25Q64JV"), Some(1));

        // Renaming to its own name is allowed
        apply_edit(&mut db, "W25Q64JV", "name", "W25Q64JV").unwrap();
    }

    #[test]
    fn test_rejected_edits_leave_db_unchanged() {
        let mut db = db();
        let before = db.clone();

        assert!(apply_edit(&mut db, "W25Q64", "name", "W25Q32").is_err());
        assert!(apply_edit(&mut db, "W25Q64", "name", "#W25Q64").is_err());
        assert!(apply_edit(&mut db, "W25Q64", "opcode", "0x03").is_err());
        assert!(apply_edit(&mut db, "W25Q64", "read_cmd", "fast").is_err());
        assert!(apply_edit(&mut db, "W25Q64", "page_size", "-").is_err());
        assert!(apply_edit(&mut db, "MX25L", "read_cmd", "0x03").is_err());

        assert_eq!(db, before);
    }

    #[test]
    fn test_unknown_param_lists_names() {
        let err = apply_edit(&mut db(), "W25Q64", "opcode", "1").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Unknown parameter 'opcode'"));
        assert!(msg.contains("page_size"));
        assert!(msg.contains("busy_state"));
    }

    #[test]
    fn test_dirty_db_is_not_overwritten() {
        let text = format!("{}broken, 1, 2\n", DB);
        let load = SpiNorDb::load(&text);
        assert_eq!(load.errors.len(), 1);

        let db_path = Path::new("chips.csv");
        assert!(check_writable(&load, db_path, db_path).is_err());
        assert!(check_writable(&load, db_path, Path::new("fixed.csv")).is_ok());
        assert!(check_writable(&SpiNorDb::load(DB), db_path, db_path).is_ok());
    }
}
