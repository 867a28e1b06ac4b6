//! Level and building-type parser
//!
//! Level entries are a grid of pointers to per-block object lists; the
//! shared "THINGS" entry defines every building type by byte offset. The
//! parser walks the grid once, collecting building instances in encounter
//! order and each distinct type id exactly once, then resolves the type
//! records (dimensions, tile matrix, collision boxes, sprite resource name)
//! from the THINGS buffer.

use crate::buffer::MemRange;
use crate::{DatError, Result};

use std::collections::BTreeMap;

// object record layout within the level buffer
const OBJ_OFFS_TYPE: usize = 0;
const OBJ_OFFS_Y: usize = 6;
const OBJ_OFFS_X: usize = 8;
const OBJ_OFFS_BBOX_Y: usize = 10;
const OBJ_OFFS_BBOX_X: usize = 12;

// building type record layout within the THINGS buffer
const TYPE_OFFS_BLOCK_ID: usize = 0;
const TYPE_OFFS_WIDTH: usize = 2;
const TYPE_OFFS_HEIGHT: usize = 4;
const TYPE_OFFS_BLOCK_MATRIX: usize = 6;
const TYPE_OFFS_NUM_BBOXES: usize = 8;
const TYPE_OFFS_BBOXES: usize = 10;
const BBOX_RECORD_SIZE: usize = 12;

/// Tile edge length; the block matrix has one entry per 16x16 pixel tile
const TILE_SIZE: usize = 16;

/// Vertical world-unit scale applied to stored y coordinates
///
/// Observed format revisions disagree on this factor (8 here, 2 in the
/// simulation layer of one revision); confirm against reference data when
/// targeting another game version.
const Y_SCALE: u16 = 8;

/// Maps a type record's block-identifier word to the graphics archive entry
/// supplying its sprite. Ids missing here occur in legacy data and degrade
/// to an empty resource name.
static GFX_RESOURCES: &[(u16, &str)] = &[
    (0x0000, "MOBJECTS"),
    (0x0CA8, "WOBJECTS"),
    (0x1B50, "DOBJECTS"),
    (0x2AF8, "COBJECTS"),
    (0x3DA0, "NOBJECTS"),
];

/// One placed building: a type reference plus world positions
#[derive(Debug, Clone, Copy)]
pub struct BuildingInstance {
    /// Index into the THINGS definition table
    pub type_id: u16,
    /// Sprite-draw x position, world units
    pub x: u16,
    /// Sprite-draw y position, world units
    pub y: u16,
    /// Collision-box anchor x position, world units
    pub bbox_x: u16,
    /// Collision-box anchor y position, world units
    pub bbox_y: u16,
}

/// Axis-aligned collision box, two opposite corners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BBox {
    /// First corner x
    pub x1: i16,
    /// First corner y
    pub y1: i16,
    /// Second corner x
    pub x2: i16,
    /// Second corner y
    pub y2: i16,
    /// First corner z
    pub z1: i16,
    /// Second corner z
    pub z2: i16,
}

/// A placeable building template
#[derive(Debug, Clone, Default)]
pub struct BuildingType {
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
    /// Graphics archive entry supplying the sprite; empty when the block id
    /// has no known mapping
    pub resource_name: String,
    /// Tile-index matrix, `(width/16) * (height/16)` entries in row order
    pub blocks: Vec<u16>,
    /// Collision boxes
    pub bboxes: Vec<BBox>,
}

/// Parsed level: building instances and the types they reference
#[derive(Debug)]
pub struct DatLevel {
    building_instances: Vec<BuildingInstance>,
    building_types: BTreeMap<u16, BuildingType>,
}

impl DatLevel {
    /// Parse level data against the shared THINGS buffer
    ///
    /// `width_blocks`/`height_blocks` give the level grid dimensions; the
    /// level buffer starts with one u16 pointer per grid block.
    pub fn parse<L, T>(
        leveldata: &L,
        thingsdata: &T,
        width_blocks: usize,
        height_blocks: usize,
    ) -> Result<Self>
    where
        L: MemRange + ?Sized,
        T: MemRange + ?Sized,
    {
        let mut building_instances = Vec::new();
        let mut building_types = BTreeMap::new();

        for nblock in 0..width_blocks * height_blocks {
            let blockdata_offset = leveldata.get_word(nblock * 2)? as usize;
            let data_count = leveldata.get_word(blockdata_offset)? as usize;

            for ndata in 0..data_count {
                let data_offset = leveldata.get_word(blockdata_offset + 2 + 2 * ndata)? as usize;

                let instance = BuildingInstance {
                    type_id: leveldata.get_word(data_offset + OBJ_OFFS_TYPE)?,
                    x: leveldata.get_word(data_offset + OBJ_OFFS_X)?,
                    y: leveldata.get_word(data_offset + OBJ_OFFS_Y)?.wrapping_mul(Y_SCALE),
                    bbox_x: leveldata.get_word(data_offset + OBJ_OFFS_BBOX_X)?,
                    bbox_y: leveldata
                        .get_word(data_offset + OBJ_OFFS_BBOX_Y)?
                        .wrapping_mul(Y_SCALE),
                };

                building_types
                    .entry(instance.type_id)
                    .or_insert_with(BuildingType::default);
                building_instances.push(instance);
            }
        }

        for (&type_id, building_type) in &mut building_types {
            let offset = type_id as usize;

            let block_id = thingsdata.get_word(offset + TYPE_OFFS_BLOCK_ID)?;
            match GFX_RESOURCES.iter().find(|&&(id, _)| id == block_id) {
                Some(&(_, name)) => building_type.resource_name = name.to_string(),
                None => {
                    // legacy levels reference a few unmapped internal types;
                    // not fatal, the building just has no sprite resource
                    log::warn!(
                        "no graphics resource known for block id {block_id:#06x} (building type {type_id:#06x})"
                    );
                }
            }

            building_type.width = thingsdata.get_word(offset + TYPE_OFFS_WIDTH)?;
            building_type.height = thingsdata.get_word(offset + TYPE_OFFS_HEIGHT)?;

            let block_matrix_offset = thingsdata.get_word(offset + TYPE_OFFS_BLOCK_MATRIX)? as usize;
            let num_tiles = (building_type.width as usize / TILE_SIZE)
                * (building_type.height as usize / TILE_SIZE);
            for ntile in 0..num_tiles {
                building_type
                    .blocks
                    .push(thingsdata.get_word(block_matrix_offset + ntile * 2)?);
            }

            let num_bboxes = thingsdata.get_word(offset + TYPE_OFFS_NUM_BBOXES)? as usize;
            for nbbox in 0..num_bboxes {
                let bbox_offset = offset + TYPE_OFFS_BBOXES + nbbox * BBOX_RECORD_SIZE;

                // storage order is y-before-x, a quirk of the source format
                building_type.bboxes.push(BBox {
                    y1: thingsdata.get_sword(bbox_offset)?,
                    x1: thingsdata.get_sword(bbox_offset + 2)?,
                    y2: thingsdata.get_sword(bbox_offset + 4)?,
                    x2: thingsdata.get_sword(bbox_offset + 6)?,
                    z1: thingsdata.get_sword(bbox_offset + 8)?,
                    z2: thingsdata.get_sword(bbox_offset + 10)?,
                });
            }
        }

        Ok(Self {
            building_instances,
            building_types,
        })
    }

    /// Visit every building instance in encounter order
    pub fn for_each_building_instance<F>(&self, mut f: F)
    where
        F: FnMut(&BuildingInstance),
    {
        for instance in &self.building_instances {
            f(instance);
        }
    }

    /// Visit every building type in type-id order
    pub fn for_each_building_type<F>(&self, mut f: F)
    where
        F: FnMut(u16, &BuildingType),
    {
        for (&type_id, building_type) in &self.building_types {
            f(type_id, building_type);
        }
    }

    /// Number of building instances
    pub fn num_building_instances(&self) -> usize {
        self.building_instances.len()
    }

    /// Look up a building type by id
    ///
    /// Fails for ids never encountered in the level data; a successful
    /// lookup may still carry an empty resource name (unmapped block id).
    pub fn building_type(&self, type_id: u16) -> Result<&BuildingType> {
        self.building_types
            .get(&type_id)
            .ok_or(DatError::UnknownBuildingType(type_id))
    }
}
