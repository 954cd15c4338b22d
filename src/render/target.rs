use crate::{
    data_structures::texture::{TextureData, TextureFormat},
    device::{DeviceTexture, GraphicsDevice},
    tables::{TextureHandle, TextureTable},
};

/// Most colour attachments a target may have.
pub const MAX_COLOR_ATTACHMENTS: usize = 8;

pub const GBUFFER_FORMATS: [TextureFormat; 4] = [
    TextureFormat::Rgba,    // albedo
    TextureFormat::Rgba16F, // normal
    TextureFormat::Rgba,    // material
    TextureFormat::Rgba32F, // world position
];
pub const LIGHTING_FORMAT: TextureFormat = TextureFormat::Rgba;
pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth;

/// An off-screen target whose attachments live in the texture table.
///
/// Colour attachments occupy consecutive handles starting at
/// `first_color`, so later passes can address them by index.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderTarget {
    first_color: TextureHandle,
    color_formats: Vec<TextureFormat>,
    depth: TextureHandle,
    width: u32,
    height: u32,
    label: String,
}

impl RenderTarget {
    pub fn new<D: GraphicsDevice>(
        textures: &mut TextureTable<D>,
        width: u32,
        height: u32,
        color_formats: &[TextureFormat],
        label: &str,
    ) -> Self {
        crate::require!(
            !color_formats.is_empty(),
            "{label}: a render target needs at least one colour attachment"
        );
        crate::require!(
            color_formats.len() <= MAX_COLOR_ATTACHMENTS,
            "{label}: {} colour attachments, at most {} are supported",
            color_formats.len(),
            MAX_COLOR_ATTACHMENTS
        );
        crate::require!(
            color_formats.iter().all(|f| !f.is_depth()),
            "{label}: depth formats cannot be colour attachments"
        );
        crate::require!(width > 0 && height > 0, "{label}: empty render target {width}x{height}");

        let colors: Vec<_> = color_formats
            .iter()
            .enumerate()
            .map(|(i, &format)| {
                textures.create_texture(
                    &TextureData::empty(width, height, format),
                    &format!("{label}_color{i}"),
                )
            })
            .collect();
        let first_color = textures.add_all(colors);
        let depth = textures.create(
            &TextureData::empty(width, height, DEPTH_FORMAT),
            &format!("{label}_depth"),
        );

        let target = Self {
            first_color,
            color_formats: color_formats.to_vec(),
            depth,
            width,
            height,
            label: label.to_string(),
        };
        target.validate(textures);
        log::debug!(
            "Render target {label}: {width}x{height}, {} colour attachments from {:?}",
            target.color_count(),
            first_color
        );
        target
    }

    /// The deferred renderer's G-buffer.
    pub fn gbuffer<D: GraphicsDevice>(textures: &mut TextureTable<D>, width: u32, height: u32) -> Self {
        Self::new(textures, width, height, &GBUFFER_FORMATS, "gbuffer")
    }

    pub fn lighting<D: GraphicsDevice>(textures: &mut TextureTable<D>, width: u32, height: u32) -> Self {
        Self::new(textures, width, height, &[LIGHTING_FORMAT], "lighting_target")
    }

    /// Rebuild every attachment at a new size behind the same handles.
    ///
    /// Returns false when the size is unchanged or empty and nothing was
    /// rebuilt.
    pub fn resize<D: GraphicsDevice>(
        &mut self,
        textures: &mut TextureTable<D>,
        width: u32,
        height: u32,
    ) -> bool {
        if width == 0 || height == 0 || (width == self.width && height == self.height) {
            return false;
        }
        let attachments: Vec<_> = self
            .colors()
            .zip(self.color_formats.iter().copied())
            .enumerate()
            .map(|(i, (handle, format))| (handle, format, format!("{}_color{i}", self.label)))
            .chain(std::iter::once((
                self.depth,
                DEPTH_FORMAT,
                format!("{}_depth", self.label),
            )))
            .collect();
        for (handle, format, label) in attachments {
            let texture = textures.create_texture(&TextureData::empty(width, height, format), &label);
            textures.replace(handle, texture);
        }
        self.width = width;
        self.height = height;
        self.validate(textures);
        log::debug!("Render target {}: resized to {width}x{height}", self.label);
        true
    }

    fn validate<D: GraphicsDevice>(&self, textures: &TextureTable<D>) {
        for handle in self.handles() {
            let texture = textures.get(handle);
            crate::require!(
                texture.width() == self.width && texture.height() == self.height,
                "{}: attachment {:?} is {}x{}, target is {}x{}",
                self.label,
                handle,
                texture.width(),
                texture.height(),
                self.width,
                self.height
            );
        }
    }

    pub fn color(&self, index: usize) -> TextureHandle {
        crate::require!(
            index < self.color_count(),
            "{}: colour attachment {index} out of range",
            self.label
        );
        self.first_color.offset(index as u32)
    }

    pub fn colors(&self) -> impl Iterator<Item = TextureHandle> + '_ {
        (0..self.color_count()).map(|i| self.first_color.offset(i as u32))
    }

    /// Every attachment, colour first, depth last.
    pub fn handles(&self) -> impl Iterator<Item = TextureHandle> + '_ {
        self.colors().chain(std::iter::once(self.depth))
    }

    pub fn contains(&self, handle: TextureHandle) -> bool {
        handle == self.depth
            || (handle >= self.first_color && handle.index() < self.first_color.index() + self.color_count() as u32)
    }

    pub fn first_color(&self) -> TextureHandle {
        self.first_color
    }

    pub fn color_count(&self) -> usize {
        self.color_formats.len()
    }

    pub fn color_formats(&self) -> &[TextureFormat] {
        &self.color_formats
    }

    pub fn depth(&self) -> TextureHandle {
        self.depth
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::HostDevice;

    #[test]
    fn attachments_are_consecutive_table_entries() {
        let mut textures = TextureTable::new(HostDevice::new());
        let white = textures.create(&TextureData::solid([255; 4]), "white");
        let gbuffer = RenderTarget::gbuffer(&mut textures, 64, 32);

        assert_eq!(gbuffer.first_color().index(), 1);
        assert_eq!(gbuffer.color(3).index(), 4);
        assert_eq!(gbuffer.depth().index(), 5);
        assert_eq!(textures.len(), 6);
        assert!(gbuffer.contains(gbuffer.color(2)));
        assert!(!gbuffer.contains(white));
        assert!(!textures.records()[5].is_sampleable());
    }

    #[test]
    #[should_panic(expected = "at least one colour attachment")]
    fn targets_without_colour_are_fatal() {
        let mut textures = TextureTable::new(HostDevice::new());
        RenderTarget::new(&mut textures, 8, 8, &[], "empty");
    }

    #[test]
    #[should_panic(expected = "at most 8")]
    fn too_many_attachments_are_fatal() {
        let mut textures = TextureTable::new(HostDevice::new());
        RenderTarget::new(&mut textures, 8, 8, &[TextureFormat::Rgba; 9], "wide");
    }

    #[test]
    fn eight_attachments_are_allowed() {
        let mut textures = TextureTable::new(HostDevice::new());
        let wide = RenderTarget::new(&mut textures, 8, 8, &[TextureFormat::Rgba; 8], "wide");
        assert_eq!(wide.color_count(), 8);
        assert_eq!(textures.len(), 9);
    }

    #[test]
    fn resizing_keeps_handles_and_table_size() {
        let mut textures = TextureTable::new(HostDevice::new());
        let mut gbuffer = RenderTarget::gbuffer(&mut textures, 800, 600);
        let handles: Vec<_> = gbuffer.handles().collect();

        for step in 1..=200 {
            assert!(gbuffer.resize(&mut textures, 800 + step, 600));
        }
        assert_eq!(textures.len(), 5);
        assert_eq!(gbuffer.handles().collect::<Vec<_>>(), handles);
        assert_eq!((gbuffer.width(), gbuffer.height()), (1000, 600));
        for handle in gbuffer.handles() {
            assert_eq!(textures.get(handle).width(), 1000);
            assert_eq!(textures.records()[handle.index() as usize].width, 1000);
        }
        assert!(!textures.records()[gbuffer.depth().index() as usize].is_sampleable());
    }

    #[test]
    fn same_or_empty_sizes_are_ignored() {
        let mut textures = TextureTable::new(HostDevice::new());
        let mut lighting = RenderTarget::lighting(&mut textures, 64, 32);
        assert!(!lighting.resize(&mut textures, 64, 32));
        assert!(!lighting.resize(&mut textures, 0, 32));
        assert_eq!((lighting.width(), lighting.height()), (64, 32));
    }
}
