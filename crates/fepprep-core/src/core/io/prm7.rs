use super::error::StructureError;
use super::formats::Format;
use super::traits::StructureFile;
use crate::core::models::molecule::Molecule;
use std::collections::HashMap;
use std::io::BufRead;

const FLAG_PREFIX: &str = "%FLAG";
const FORMAT_PREFIX: &str = "%FORMAT";
const ATOM_NAME_FLAG: &str = "ATOM_NAME";
const POINTERS_FLAG: &str = "POINTERS";

/// A fixed-width Fortran edit descriptor such as `(20a4)` or `(10I8)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FieldFormat {
    per_line: usize,
    width: usize,
}

impl FieldFormat {
    fn parse(descriptor: &str) -> Option<Self> {
        let inner = descriptor.trim().strip_prefix('(')?.strip_suffix(')')?;
        let kind_pos = inner.find(|c: char| c.is_ascii_alphabetic())?;
        let per_line = inner[..kind_pos].parse().ok()?;
        let width_part = &inner[kind_pos + 1..];
        let width_end = width_part.find('.').unwrap_or(width_part.len());
        let width: usize = width_part[..width_end].parse().ok()?;
        (width > 0).then_some(Self { per_line, width })
    }

    fn split<'a>(self, line: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let width = self.width;
        (0..line.len())
            .step_by(width)
            .take(self.per_line)
            .filter_map(move |start| line.get(start..(start + width).min(line.len())))
    }
}

#[derive(Debug)]
struct Section {
    flag_line: usize,
    format: Option<FieldFormat>,
    lines: Vec<String>,
}

impl Section {
    fn fields(&self, flag: &'static str) -> Result<Vec<&str>, StructureError> {
        let format = self.format.ok_or_else(|| {
            StructureError::parse(
                Format::Prm7,
                self.flag_line,
                format!("section {} has no valid %FORMAT line", flag),
            )
        })?;
        Ok(self
            .lines
            .iter()
            .flat_map(|line| format.split(line))
            .collect())
    }
}

/// Reader for AMBER parm7 topologies.
///
/// Atom names come from the `ATOM_NAME` section; the count is checked against NATOM,
/// the first entry of `POINTERS`.
pub struct Prm7File;

impl Prm7File {
    fn read_sections(
        reader: &mut impl BufRead,
    ) -> Result<HashMap<String, Section>, StructureError> {
        let mut sections: HashMap<String, Section> = HashMap::new();
        let mut current: Option<String> = None;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            if let Some(rest) = line.strip_prefix(FLAG_PREFIX) {
                let flag = rest.trim().to_string();
                if flag.is_empty() {
                    return Err(StructureError::parse(
                        Format::Prm7,
                        line_num,
                        "%FLAG line without a section name",
                    ));
                }
                sections.insert(
                    flag.clone(),
                    Section {
                        flag_line: line_num,
                        format: None,
                        lines: Vec::new(),
                    },
                );
                current = Some(flag);
            } else if let Some(rest) = line.strip_prefix(FORMAT_PREFIX) {
                let Some(section) = current.as_ref().and_then(|flag| sections.get_mut(flag))
                else {
                    return Err(StructureError::parse(
                        Format::Prm7,
                        line_num,
                        "%FORMAT line outside of a %FLAG section",
                    ));
                };
                section.format = Some(FieldFormat::parse(rest).ok_or_else(|| {
                    StructureError::parse(
                        Format::Prm7,
                        line_num,
                        format!("unsupported format descriptor '{}'", rest.trim()),
                    )
                })?);
            } else if line.starts_with('%') {
                // %VERSION, %COMMENT and friends carry no data.
                continue;
            } else if let Some(section) = current.as_ref().and_then(|flag| sections.get_mut(flag))
            {
                section.lines.push(line);
            }
        }

        Ok(sections)
    }
}

impl StructureFile for Prm7File {
    fn read_from(reader: &mut impl BufRead, name: &str) -> Result<Molecule, StructureError> {
        let sections = Self::read_sections(reader)?;

        let pointers = sections
            .get(POINTERS_FLAG)
            .ok_or(StructureError::MissingSection {
                format: Format::Prm7,
                section: POINTERS_FLAG,
            })?;
        let natom_field = pointers
            .fields(POINTERS_FLAG)?
            .first()
            .map(|field| field.trim().to_string())
            .unwrap_or_default();
        let natom: usize = natom_field.parse().map_err(|_| {
            StructureError::parse(
                Format::Prm7,
                pointers.flag_line,
                format!("invalid NATOM value '{}'", natom_field),
            )
        })?;

        let names_section =
            sections
                .get(ATOM_NAME_FLAG)
                .ok_or(StructureError::MissingSection {
                    format: Format::Prm7,
                    section: ATOM_NAME_FLAG,
                })?;
        let atom_names: Vec<&str> = names_section
            .fields(ATOM_NAME_FLAG)?
            .into_iter()
            .map(str::trim)
            .collect();

        if atom_names.len() != natom {
            return Err(StructureError::Inconsistency {
                format: Format::Prm7,
                details: format!(
                    "POINTERS declares {} atoms but ATOM_NAME lists {}",
                    natom,
                    atom_names.len()
                ),
            });
        }

        Ok(Molecule::from_names(name, atom_names))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn topology(natom: usize, name_lines: &[&str]) -> String {
        let mut content = String::from(
            "%VERSION  VERSION_STAMP = V0001.000  DATE = 01/01/24  00:00:00\n\
             %FLAG TITLE\n\
             %FORMAT(20a4)\n\
             LIG\n\
             %FLAG POINTERS\n\
             %FORMAT(10I8)\n",
        );
        content.push_str(&format!(
            "{:>8}{:>8}{:>8}{:>8}{:>8}{:>8}{:>8}{:>8}{:>8}{:>8}\n",
            natom, 4, 6, 8, 10, 12, 14, 16, 0, 0
        ));
        content.push_str("%FLAG ATOM_NAME\n%FORMAT(20a4)\n");
        for line in name_lines {
            content.push_str(line);
            content.push('\n');
        }
        content.push_str("%FLAG CHARGE\n%FORMAT(5E16.8)\n  1.00000000E+00\n");
        content
    }

    #[test]
    fn field_format_parses_common_descriptors() {
        assert_eq!(
            FieldFormat::parse("(20a4)"),
            Some(FieldFormat {
                per_line: 20,
                width: 4
            })
        );
        assert_eq!(
            FieldFormat::parse("  (5E16.8)"),
            Some(FieldFormat {
                per_line: 5,
                width: 16
            })
        );
        assert_eq!(FieldFormat::parse("20a4"), None);
        assert_eq!(FieldFormat::parse("(20a0)"), None);
    }

    #[test]
    fn reads_atom_names_across_lines() {
        let first = "C1  C2  C3  C4  C5  C6  C7  C8  C9  C10 C11 C12 C13 C14 C15 C16 C17 C18 C19 C20 ";
        let content = topology(22, &[first, "H1  H2"]);

        let mol = Prm7File::read_from(&mut Cursor::new(content), "ligand01").unwrap();
        assert_eq!(mol.len(), 22);
        assert_eq!(mol.atom(0).unwrap().name, "C1");
        assert_eq!(mol.atom(19).unwrap().name, "C20");
        assert_eq!(mol.atom(21).unwrap().name, "H2");
    }

    #[test]
    fn atom_count_must_match_pointers() {
        let content = topology(3, &["C1  C2  "]);
        let result = Prm7File::read_from(&mut Cursor::new(content), "lig");
        assert!(matches!(
            result,
            Err(StructureError::Inconsistency {
                format: Format::Prm7,
                ..
            })
        ));
    }

    #[test]
    fn missing_atom_name_section_is_reported() {
        let content = "%FLAG POINTERS\n%FORMAT(10I8)\n       2\n";
        let result = Prm7File::read_from(&mut Cursor::new(content), "lig");
        assert!(matches!(
            result,
            Err(StructureError::MissingSection {
                section: ATOM_NAME_FLAG,
                ..
            })
        ));
    }

    #[test]
    fn read_from_path_names_molecule_after_file_stem() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ligand31.prm7");
        fs::write(&path, topology(2, &["C1  O1  "])).unwrap();

        let mol = Prm7File::read_from_path(&path).unwrap();
        assert_eq!(mol.name, "ligand31");
        assert_eq!(mol.atom(1).unwrap().name, "O1");
    }

    #[test]
    fn read_from_path_fails_for_missing_file() {
        let dir = tempdir().unwrap();
        let result = Prm7File::read_from_path(dir.path().join("absent.prm7"));
        assert!(matches!(result, Err(StructureError::Io(_))));
    }
}
