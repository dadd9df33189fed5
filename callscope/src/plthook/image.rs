//! View of the traced binary: section table plus live-memory reads.
//!
//! The installer needs two things from the image: the section headers of
//! the on-disk ELF (to locate `.plt`) and a few bytes of the mapped PLT
//! entries (to recover each relocation offset). [`BinaryImage`] keeps both
//! behind one trait so tests can substitute a synthetic image.

use std::fs;
use std::path::Path;

use object::{Object, ObjectSection};

use crate::domain::InstallError;

/// Name, virtual address, and size of one ELF section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionInfo {
    pub name: String,
    pub addr: u64,
    pub size: u64,
}

/// The parts of a loaded binary the trampoline installer consumes.
pub trait BinaryImage {
    /// Section headers of the image, link-time addresses.
    fn sections(&self) -> &[SectionInfo];

    /// Copy `out.len()` bytes of mapped image memory starting at the
    /// runtime address `addr`.
    fn read(&self, addr: u64, out: &mut [u8]) -> Result<(), InstallError>;
}

/// [`BinaryImage`] over the traced process's own mapped ELF.
///
/// Section headers come from the on-disk file via the `object` crate;
/// `read` touches the live mapping directly, which is valid because the
/// tracer core runs inside the traced process.
#[derive(Debug)]
pub struct ElfImage {
    sections: Vec<SectionInfo>,
}

impl ElfImage {
    /// Parse the section table of the binary at `path`.
    pub fn open(path: &Path) -> Result<Self, InstallError> {
        let data = fs::read(path)?;
        let file = object::File::parse(&*data)?;

        let mut sections = Vec::new();
        for section in file.sections() {
            let Ok(name) = section.name() else { continue };
            sections.push(SectionInfo {
                name: name.to_string(),
                addr: section.address(),
                size: section.size(),
            });
        }
        Ok(Self { sections })
    }
}

impl BinaryImage for ElfImage {
    fn sections(&self) -> &[SectionInfo] {
        &self.sections
    }

    fn read(&self, addr: u64, out: &mut [u8]) -> Result<(), InstallError> {
        if addr == 0 {
            return Err(InstallError::ImageRead { addr, len: out.len() });
        }
        // The address is a mapped PLT entry of this very process.
        unsafe {
            std::ptr::copy_nonoverlapping(addr as *const u8, out.as_mut_ptr(), out.len());
        }
        Ok(())
    }
}
