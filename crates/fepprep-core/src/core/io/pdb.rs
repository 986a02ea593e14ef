use super::error::StructureError;
use super::formats::Format;
use super::traits::StructureFile;
use crate::core::models::molecule::Molecule;
use std::io::BufRead;

const NAME_COLUMNS: std::ops::Range<usize> = 12..16;

pub struct PdbFile;

impl StructureFile for PdbFile {
    fn read_from(reader: &mut impl BufRead, name: &str) -> Result<Molecule, StructureError> {
        let mut atom_names = Vec::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            let record_type = line.get(0..6).unwrap_or(&line).trim_end();
            match record_type {
                "ATOM" | "HETATM" => {
                    let atom_name = line.get(NAME_COLUMNS).map(str::trim).ok_or_else(|| {
                        StructureError::parse(
                            Format::Pdb,
                            line_num,
                            "ATOM/HETATM record is too short to hold an atom name (columns 13-16)",
                        )
                    })?;
                    if atom_name.is_empty() {
                        return Err(StructureError::parse(
                            Format::Pdb,
                            line_num,
                            "atom name in columns 13-16 is empty",
                        ));
                    }
                    atom_names.push(atom_name.to_string());
                }
                "ENDMDL" | "END" => break,
                _ => {}
            }
        }

        if atom_names.is_empty() {
            return Err(StructureError::MissingSection {
                format: Format::Pdb,
                section: "ATOM/HETATM records",
            });
        }
        Ok(Molecule::from_names(name, atom_names))
    }
}
