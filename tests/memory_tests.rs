use cpm68k::{AddressBus, Memory};

/// Property 3: a word read equals the big-endian combination of its two
/// constituent bytes.
#[test]
fn word_read_matches_big_endian_byte_pair() {
    let mut mem = Memory::new();
    mem.write_byte(0x1000, 0x12);
    mem.write_byte(0x1001, 0x34);

    assert_eq!(mem.read_word(0x1000), 0x1234);
}

/// Property 4: a long written and read back at the same address round-trips.
#[test]
fn long_write_then_read_round_trips() {
    let mut mem = Memory::new();
    mem.write_long(0x2000, 0xDEAD_BEEF);
    assert_eq!(mem.read_long(0x2000), 0xDEAD_BEEF);
}

/// Property 13: a long access straddling the top of the 24-bit address
/// space wraps its high half back to address 0.
#[test]
fn long_access_at_top_of_address_space_wraps_to_zero() {
    let mut mem = Memory::new();
    mem.write_long(0x00FF_FFFE, 0x1122_3344);

    assert_eq!(mem.read_byte(0x00FF_FFFE), 0x11);
    assert_eq!(mem.read_byte(0x00FF_FFFF), 0x22);
    assert_eq!(mem.read_byte(0x0000_0000), 0x33);
    assert_eq!(mem.read_byte(0x0000_0001), 0x44);
    assert_eq!(mem.read_long(0x00FF_FFFE), 0x1122_3344);
}

/// Addresses beyond the 16 MiB window fold back modulo 0x1000000.
#[test]
fn addresses_beyond_16mib_fold_back_into_range() {
    let mut mem = Memory::new();
    mem.write_byte(0x0100_0010, 0x99); // aliases 0x10
    assert_eq!(mem.read_byte(0x0000_0010), 0x99);
}

/// `load_bytes` places a contiguous run of guest code/data verbatim.
#[test]
fn load_bytes_places_a_contiguous_run() {
    let mut mem = Memory::new();
    mem.load_bytes(0x3000, &[0xDE, 0xAD, 0xBE, 0xEF]);
    assert_eq!(mem.read_long(0x3000), 0xDEAD_BEEF);
}
