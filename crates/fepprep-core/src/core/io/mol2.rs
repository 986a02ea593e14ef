use super::error::StructureError;
use super::formats::Format;
use super::traits::StructureFile;
use crate::core::models::molecule::Molecule;
use std::io::BufRead;

const ATOM_SECTION: &str = "@<TRIPOS>ATOM";
const SECTION_PREFIX: &str = "@<TRIPOS>";

pub struct Mol2File;

impl StructureFile for Mol2File {
    fn read_from(reader: &mut impl BufRead, name: &str) -> Result<Molecule, StructureError> {
        let mut in_atom_section = false;
        let mut seen_atom_section = false;
        let mut atom_names = Vec::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            let trimmed = line.trim();

            if trimmed.starts_with(SECTION_PREFIX) {
                if seen_atom_section {
                    break;
                }
                in_atom_section = trimmed.eq_ignore_ascii_case(ATOM_SECTION);
                seen_atom_section = in_atom_section;
                continue;
            }
            if !in_atom_section || trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let mut fields = trimmed.split_whitespace();
            let _atom_id = fields.next();
            let atom_name = fields.next().ok_or_else(|| {
                StructureError::parse(Format::Mol2, line_num, "atom record has no name column")
            })?;
            atom_names.push(atom_name.to_string());
        }

        if !seen_atom_section {
            return Err(StructureError::MissingSection {
                format: Format::Mol2,
                section: ATOM_SECTION,
            });
        }
        Ok(Molecule::from_names(name, atom_names))
    }
}
