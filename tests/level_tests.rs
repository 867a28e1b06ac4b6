//! Level parser tests over hand-built level and THINGS buffers

use strikedat::{BBox, Buffer, DatError, DatLevel};

fn put_word(buf: &mut Vec<u8>, offset: usize, value: u16) {
    if buf.len() < offset + 2 {
        buf.resize(offset + 2, 0);
    }
    buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

/// 2x1 grid, three objects, two of them sharing a type
fn build_level() -> Buffer {
    let mut level = Vec::new();

    // grid pointers
    put_word(&mut level, 0, 8); // block 0 list
    put_word(&mut level, 2, 14); // block 1 list

    // block 0: two objects
    put_word(&mut level, 8, 2);
    put_word(&mut level, 10, 20);
    put_word(&mut level, 12, 34);

    // block 1: one object
    put_word(&mut level, 14, 1);
    put_word(&mut level, 16, 48);

    // object records: type @ +0, y @ +6, x @ +8, bbox y @ +10, bbox x @ +12
    put_word(&mut level, 20, 0x0010);
    put_word(&mut level, 26, 3);
    put_word(&mut level, 28, 100);
    put_word(&mut level, 30, 5);
    put_word(&mut level, 32, 102);

    put_word(&mut level, 34, 0x0030);
    put_word(&mut level, 40, 7);
    put_word(&mut level, 42, 200);
    put_word(&mut level, 44, 7);
    put_word(&mut level, 46, 200);

    // same type as the first object
    put_word(&mut level, 48, 0x0010);
    put_word(&mut level, 54, 1);
    put_word(&mut level, 56, 300);
    put_word(&mut level, 58, 1);
    put_word(&mut level, 60, 300);

    Buffer::from(level)
}

fn build_things() -> Buffer {
    let mut things = Vec::new();

    // type 0x0010: mapped block id, 32x16, two tiles, one bbox
    put_word(&mut things, 0x10, 0x0000); // block id -> MOBJECTS
    put_word(&mut things, 0x12, 32);
    put_word(&mut things, 0x14, 16);
    put_word(&mut things, 0x16, 0x60); // block matrix pointer
    put_word(&mut things, 0x18, 1); // bbox count
    // bbox record, y-before-x storage order
    put_word(&mut things, 0x1A, 1); // y1
    put_word(&mut things, 0x1C, 2); // x1
    put_word(&mut things, 0x1E, 3); // y2
    put_word(&mut things, 0x20, 4); // x2
    put_word(&mut things, 0x22, (-5i16) as u16); // z1
    put_word(&mut things, 0x24, 6); // z2

    // type 0x0030: unmapped block id, 16x16, one tile, no bboxes
    put_word(&mut things, 0x30, 0x4242);
    put_word(&mut things, 0x32, 16);
    put_word(&mut things, 0x34, 16);
    put_word(&mut things, 0x36, 0x70);
    put_word(&mut things, 0x38, 0);

    // block matrices
    put_word(&mut things, 0x60, 5);
    put_word(&mut things, 0x62, 6);
    put_word(&mut things, 0x70, 7);

    Buffer::from(things)
}

#[test]
fn test_building_instances() {
    let level = DatLevel::parse(&build_level(), &build_things(), 2, 1).unwrap();

    assert_eq!(level.num_building_instances(), 3);

    let mut instances = Vec::new();
    level.for_each_building_instance(|bi| instances.push(*bi));

    // encounter order, y values scaled x8 to world units
    assert_eq!(instances[0].type_id, 0x0010);
    assert_eq!(instances[0].x, 100);
    assert_eq!(instances[0].y, 24);
    assert_eq!(instances[0].bbox_x, 102);
    assert_eq!(instances[0].bbox_y, 40);

    assert_eq!(instances[1].type_id, 0x0030);
    assert_eq!(instances[1].y, 56);

    assert_eq!(instances[2].type_id, 0x0010);
    assert_eq!(instances[2].x, 300);
}

#[test]
fn test_building_types() {
    let level = DatLevel::parse(&build_level(), &build_things(), 2, 1).unwrap();

    let mapped = level.building_type(0x0010).unwrap();
    assert_eq!(mapped.width, 32);
    assert_eq!(mapped.height, 16);
    assert_eq!(mapped.resource_name, "MOBJECTS");
    assert_eq!(mapped.blocks, vec![5, 6]);
    assert_eq!(
        mapped.bboxes,
        vec![BBox {
            y1: 1,
            x1: 2,
            y2: 3,
            x2: 4,
            z1: -5,
            z2: 6
        }]
    );

    // unmapped block id degrades to an empty resource name, not an error
    let unmapped = level.building_type(0x0030).unwrap();
    assert_eq!(unmapped.resource_name, "");
    assert_eq!(unmapped.blocks, vec![7]);
    assert!(unmapped.bboxes.is_empty());
}

#[test]
fn test_duplicate_types_recorded_once() {
    let level = DatLevel::parse(&build_level(), &build_things(), 2, 1).unwrap();

    let mut type_ids = Vec::new();
    level.for_each_building_type(|type_id, _| type_ids.push(type_id));

    // map order, each id once
    assert_eq!(type_ids, vec![0x0010, 0x0030]);
}

#[test]
fn test_unknown_type_lookup() {
    let level = DatLevel::parse(&build_level(), &build_things(), 2, 1).unwrap();

    assert!(matches!(
        level.building_type(0x4444),
        Err(DatError::UnknownBuildingType(0x4444))
    ));
}

#[test]
fn test_truncated_level_data() {
    let level = build_level();
    let truncated = Buffer::from(level.as_ref()[..24].to_vec());

    assert!(matches!(
        DatLevel::parse(&truncated, &build_things(), 2, 1),
        Err(DatError::OutOfRange { .. })
    ));
}

#[test]
fn test_truncated_things_data() {
    let things = build_things();
    let truncated = Buffer::from(things.as_ref()[..0x18].to_vec());

    assert!(matches!(
        DatLevel::parse(&build_level(), &truncated, 2, 1),
        Err(DatError::OutOfRange { .. })
    ));
}
