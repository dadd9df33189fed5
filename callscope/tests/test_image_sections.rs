//! Section-table parsing against a real ELF: our own test binary.

use anyhow::Result;
use callscope::{BinaryImage, ElfImage};

#[test]
fn test_own_binary_section_table() -> Result<()> {
    let exe = std::env::current_exe()?;
    let image = ElfImage::open(&exe)?;

    let text = image
        .sections()
        .iter()
        .find(|s| s.name == ".text")
        .expect("test binary must have a .text section");
    assert!(text.addr > 0);
    assert!(text.size > 0);
    Ok(())
}

#[test]
fn test_live_read_round_trips() -> Result<()> {
    let exe = std::env::current_exe()?;
    let image = ElfImage::open(&exe)?;

    // Read back a buffer in our own address space through the live-memory
    // path the installer uses for PLT entries.
    let probe = [0x68u8, 0x01, 0x02, 0x03, 0x04, 0xff, 0x25];
    let mut out = [0u8; 7];
    image.read(probe.as_ptr() as u64, &mut out)?;
    assert_eq!(out, probe);
    Ok(())
}
