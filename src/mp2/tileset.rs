/// Maps the object tileset byte of a tile or addon to the icon group drawing it.
/// The two low bits of the byte are flags (bit 1 marks roads), so groups span four values.
pub fn icon_for_tileset(tileset: u8) -> Option<&'static str> {
    let name = match tileset {
        0x11 => "TELEPORT1.ICN",
        0x12 => "TELEPORT2.ICN",
        0x13 => "TELEPORT3.ICN",
        0x14 => "FOUNTAIN.ICN",
        0x15 => "TREASURE.ICN",
        0x2C..=0x2F => "OBJNARTI.ICN",
        0x30..=0x33 => "MONS32.ICN",
        0x38..=0x3B => "FLAG32.ICN",
        0x54..=0x57 => "MINIHERO.ICN",
        0x58..=0x5B => "MTNSNOW.ICN",
        0x5C..=0x5F => "MTNSWMP.ICN",
        0x60..=0x63 => "MTNLAVA.ICN",
        0x64..=0x67 => "MTNDSRT.ICN",
        0x68..=0x6B => "MTNDIRT.ICN",
        0x6C..=0x6F => "MTNMULT.ICN",
        0x74 => "EXTRAOVR.ICN",
        0x78..=0x7B => "ROAD.ICN",
        0x7C..=0x7F => "MTNCRCK.ICN",
        0x80..=0x83 => "MTNGRAS.ICN",
        0x84..=0x87 => "TREJNGL.ICN",
        0x88..=0x8B => "TREEVIL.ICN",
        0x8C..=0x8F => "OBJNTOWN.ICN",
        0x90..=0x93 => "OBJNTWBA.ICN",
        0x94..=0x97 => "OBJNTWSH.ICN",
        0x98..=0x9B => "OBJNTWRD.ICN",
        0x9C..=0x9F => "OBJNXTRA.ICN",
        0xA0..=0xA3 => "OBJNWAT2.ICN",
        0xA4..=0xA7 => "OBJNMUL2.ICN",
        0xA8..=0xAB => "TRESNOW.ICN",
        0xAC..=0xAF => "TREFIR.ICN",
        0xB0..=0xB3 => "TREFALL.ICN",
        0xB4..=0xB7 => "STREAM.ICN",
        0xB8..=0xBB => "OBJNRSRC.ICN",
        0xC0..=0xC3 => "OBJNGRA2.ICN",
        0xC4..=0xC7 => "TREDECI.ICN",
        0xC8..=0xCB => "OBJNWATR.ICN",
        0xCC..=0xCF => "OBJNGRAS.ICN",
        0xD0..=0xD3 => "OBJNSNOW.ICN",
        0xD4..=0xD7 => "OBJNSWMP.ICN",
        0xD8..=0xDB => "OBJNLAVA.ICN",
        0xDC..=0xDF => "OBJNDSRT.ICN",
        0xE0..=0xE3 => "OBJNDIRT.ICN",
        0xE4..=0xE7 => "OBJNCRCK.ICN",
        0xE8..=0xEB => "OBJNLAV3.ICN",
        0xEC..=0xEF => "OBJNMULT.ICN",
        0xF0..=0xF3 => "OBJNLAV2.ICN",
        0xF4..=0xF7 => "X_LOC1.ICN",
        0xF8..=0xFB => "X_LOC2.ICN",
        0xFC..=0xFF => "X_LOC3.ICN",
        _ => return None,
    };
    Some(name)
}

/// tiles whose first level object is drawn from the road set
#[inline]
pub fn is_road_tileset(tileset: u8) -> bool {
    matches!(tileset, 0x78..=0x7B)
}
