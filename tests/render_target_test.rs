use defer_ngin::{
    data_structures::{light::Lights, texture::TextureData},
    device::DeviceTexture,
    render::{RenderTarget, lighting_data},
    tables::DenseIndexing,
};

use crate::common::test_utils::{host_tables, init_logger, read_u32s};
mod common;

#[test]
fn window_drags_do_not_grow_the_texture_table() {
    init_logger();
    let (device, mut tables) = host_tables(DenseIndexing::Stable);
    tables.textures.create(&TextureData::solid([255; 4]), "white");
    let mut gbuffer = RenderTarget::gbuffer(&mut tables.textures, 800, 600);
    let mut lighting = RenderTarget::lighting(&mut tables.textures, 800, 600);
    let entries = tables.textures.len();
    assert_eq!(entries, 8);

    // A drag delivers one resize per intermediate size.
    for step in 1..=300u32 {
        let (width, height) = (800 + step, 600 + step / 2);
        gbuffer.resize(&mut tables.textures, width, height);
        lighting.resize(&mut tables.textures, width, height);
    }

    assert_eq!(tables.textures.len(), entries);
    assert_eq!(device.stats().textures_created, entries + 300 * 7);
    for handle in gbuffer.handles().chain(lighting.handles()) {
        let texture = tables.textures.get(handle);
        assert_eq!((texture.width(), texture.height()), (1100, 750));
    }
}

#[test]
fn resized_attachments_are_described_in_the_record_mirror() {
    let (_, mut tables) = host_tables(DenseIndexing::Stable);
    let mut gbuffer = RenderTarget::gbuffer(&mut tables.textures, 64, 32);
    let before = lighting_data(&Lights::default(), &gbuffer).gbuffer;

    gbuffer.resize(&mut tables.textures, 128, 96);

    // Lighting keeps addressing the same handles.
    assert_eq!(lighting_data(&Lights::default(), &gbuffer).gbuffer, before);
    let position = gbuffer.color(3).index() as u64;
    let record = read_u32s(tables.textures.record_buffer(), position * 16, 2);
    assert_eq!(record, vec![128, 96]);
}
