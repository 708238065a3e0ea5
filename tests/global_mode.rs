//! Touches the process-wide struct mode, so it holds a single test.

use packwire::StructMode;

#[derive(Debug, Default, PartialEq)]
pub struct Pair {
    pub left: u8,
    pub right: u8,
}

packwire::record!(Pair { pub left, pub right });

#[test]
fn test_global_struct_mode_toggle() {
    let pair = Pair { left: 1, right: 2 };
    assert_eq!(packwire::struct_mode(), StructMode::Map);
    let as_map = packwire::encode(&pair).unwrap();
    assert_eq!(
        as_map,
        [0x82, 0xa4, b'l', b'e', b'f', b't', 0x01, 0xa5, b'r', b'i', b'g', b'h', b't', 0x02]
    );

    packwire::set_struct_mode(StructMode::Array);
    assert_eq!(packwire::struct_mode(), StructMode::Array);
    assert_eq!(packwire::encode(&pair).unwrap(), [0x92, 0x01, 0x02]);
    // forced mode still wins over the global one
    assert_eq!(packwire::encode_with_mode(&pair, StructMode::Map).unwrap(), as_map);
    assert_eq!(packwire::from_slice::<Pair>(&as_map).unwrap(), pair);

    packwire::set_struct_mode(StructMode::Map);
    assert_eq!(packwire::encode(&pair).unwrap(), as_map);
}
