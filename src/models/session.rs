// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editing session state machine.
//!
//! The session owns the current image, its mask, and the pointer and eraser
//! state. The UI feeds it [`Event`]s and repaints when the returned
//! [`Outcome`] asks for it; everything else (loading, saving, painting)
//! happens inside [`Session::handle_event`].

use crate::error::{AnnotateError, Result};
use crate::io::mask_store::MaskStore;
use crate::io::media::{ImageSet, LoadedImage};
use crate::models::mask::Mask;
use crate::render::overlay;
use crate::render::stroke::{self, StrokeMode, DEFAULT_BRUSH_RADIUS, MAX_BRUSH_RADIUS};
use crate::util::geometry::PixelPos;
use image::RgbImage;

/// Keyboard commands understood by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Previous,
    Next,
    ToggleEraser,
    ResetMask,
    Quit,
}

/// Input delivered to the session, in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    PointerDown(PixelPos),
    PointerMove(PixelPos),
    PointerUp,
    Command(Command),
}

/// Pointer state between events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeState {
    Idle,
    Drawing { last: PixelPos },
}

/// What the caller should do after an event.
#[derive(Debug, Default)]
pub struct Outcome {
    pub redraw: bool,
    pub quit: bool,
    /// A recovered problem worth showing to the user.
    pub warning: Option<AnnotateError>,
}

impl Outcome {
    fn redraw() -> Self {
        Self {
            redraw: true,
            ..Self::default()
        }
    }
}

pub struct Session {
    images: ImageSet,
    store: MaskStore,
    index: usize,
    image: LoadedImage,
    mask: Mask,
    eraser_on: bool,
    stroke: StrokeState,
    brush_radius: u32,
}

impl Session {
    /// Open the first image and its mask.
    ///
    /// A decode failure is fatal here; a corrupt saved mask is replaced by a
    /// blank one and returned as a warning.
    pub fn start(images: ImageSet, store: MaskStore) -> Result<(Self, Option<AnnotateError>)> {
        let image = images.load(0)?;
        let (mask, warning) = open_mask(&store, &image);
        log::info!(
            "Session started on {} ({} images, masks in {})",
            image.file_name,
            images.len(),
            store.dir().display()
        );

        let session = Self {
            images,
            store,
            index: 0,
            image,
            mask,
            eraser_on: false,
            stroke: StrokeState::Idle,
            brush_radius: DEFAULT_BRUSH_RADIUS,
        };
        Ok((session, warning))
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn image(&self) -> &LoadedImage {
        &self.image
    }

    #[cfg(test)]
    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn eraser_on(&self) -> bool {
        self.eraser_on
    }

    pub fn stroke_state(&self) -> StrokeState {
        self.stroke
    }

    pub fn brush_radius(&self) -> u32 {
        self.brush_radius
    }

    pub fn set_brush_radius(&mut self, radius: u32) {
        self.brush_radius = radius.min(MAX_BRUSH_RADIUS);
    }

    fn mode(&self) -> StrokeMode {
        if self.eraser_on {
            StrokeMode::Erase
        } else {
            StrokeMode::Draw
        }
    }

    /// Apply one input event.
    ///
    /// On error the session is left as it was before the event, so the user
    /// can retry.
    pub fn handle_event(&mut self, event: Event) -> Result<Outcome> {
        match event {
            Event::PointerDown(pos) => {
                let mode = self.mode();
                self.stroke = StrokeState::Drawing { last: pos };
                stroke::paint_segment(&mut self.mask, pos, pos, mode, self.brush_radius);
                Ok(Outcome::redraw())
            }
            Event::PointerMove(pos) => match self.stroke {
                StrokeState::Drawing { last } if last != pos => {
                    let mode = self.mode();
                    stroke::paint_segment(&mut self.mask, last, pos, mode, self.brush_radius);
                    self.stroke = StrokeState::Drawing { last: pos };
                    Ok(Outcome::redraw())
                }
                _ => Ok(Outcome::default()),
            },
            Event::PointerUp => {
                self.stroke = StrokeState::Idle;
                Ok(Outcome::default())
            }
            Event::Command(command) => self.handle_command(command),
        }
    }

    fn handle_command(&mut self, command: Command) -> Result<Outcome> {
        match command {
            Command::ToggleEraser => {
                self.eraser_on = !self.eraser_on;
                log::info!("Eraser {}", if self.eraser_on { "on" } else { "off" });
                Ok(Outcome::redraw())
            }
            Command::ResetMask => {
                self.mask.clear();
                log::info!("Mask reset for {} (saved on next navigation)", self.image.file_name);
                Ok(Outcome::redraw())
            }
            Command::Next if self.index + 1 < self.images.len() => self.navigate(self.index + 1),
            Command::Previous if self.index > 0 => self.navigate(self.index - 1),
            Command::Next | Command::Previous => {
                log::debug!("Navigation ignored at index {}", self.index);
                Ok(Outcome::default())
            }
            Command::Quit => {
                self.save()?;
                log::info!("Quitting");
                Ok(Outcome {
                    quit: true,
                    ..Outcome::default()
                })
            }
        }
    }

    /// Save the current mask, then switch to the image at `target`.
    fn navigate(&mut self, target: usize) -> Result<Outcome> {
        self.save()?;
        let image = self.images.load(target)?;
        let (mask, warning) = open_mask(&self.store, &image);

        log::info!(
            "Moved to {} ({}/{})",
            image.file_name,
            target + 1,
            self.images.len()
        );
        self.index = target;
        self.image = image;
        self.mask = mask;
        self.eraser_on = false;
        self.stroke = StrokeState::Idle;

        Ok(Outcome {
            redraw: true,
            quit: false,
            warning,
        })
    }

    /// Persist the current mask.
    ///
    /// A blank mask for an image that has no saved file yet is skipped, so
    /// quitting or browsing past untouched images creates nothing. Otherwise
    /// the file is written, which is how a reset commits an all-zero grid.
    pub fn save(&self) -> Result<()> {
        let name = &self.image.file_name;
        if self.mask.is_blank() && !self.store.exists(name) {
            log::debug!("Nothing drawn on {}, skipping save", name);
            return Ok(());
        }
        self.store.save(name, &self.mask)?;
        Ok(())
    }

    /// The frame to display for the current state.
    pub fn frame(&self) -> RgbImage {
        overlay::composite(&self.image.pixels, &self.mask, &self.image.file_name)
    }
}

/// Load the mask for `image`, falling back to a blank one when the saved
/// file is unusable.
fn open_mask(store: &MaskStore, image: &LoadedImage) -> (Mask, Option<AnnotateError>) {
    let (height, width) = (image.height() as usize, image.width() as usize);
    match store.load_or_create(&image.file_name, height, width) {
        Ok(mask) => {
            debug_assert_eq!(mask.dims(), (height, width));
            (mask, None)
        }
        Err(e) => {
            log::warn!("{}; starting with a blank mask", e);
            (Mask::zeros(height, width), Some(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::npy;
    use crate::models::mask::ANNOTATED;
    use image::Rgb;
    use std::path::{Path, PathBuf};
    use tempfile::{tempdir, TempDir};

    struct Fixture {
        _dir: TempDir,
        img_dir: PathBuf,
        save_dir: PathBuf,
    }

    fn fixture(images: &[(&str, u32, u32)]) -> Fixture {
        let dir = tempdir().expect("tempdir");
        let img_dir = dir.path().join("images");
        let save_dir = dir.path().join("outputs");
        std::fs::create_dir(&img_dir).unwrap();
        for (name, width, height) in images {
            RgbImage::from_pixel(*width, *height, Rgb([0, 0, 0]))
                .save(img_dir.join(name))
                .expect("save fixture");
        }
        Fixture {
            _dir: dir,
            img_dir,
            save_dir,
        }
    }

    fn start(f: &Fixture) -> Session {
        let images = ImageSet::open(&f.img_dir).expect("open images");
        let (session, warning) = Session::start(images, MaskStore::new(&f.save_dir)).expect("start");
        assert!(warning.is_none());
        session
    }

    fn press(session: &mut Session, command: Command) -> Outcome {
        session.handle_event(Event::Command(command)).expect("command")
    }

    fn click(session: &mut Session, x: i32, y: i32) {
        session.handle_event(Event::PointerDown(PixelPos::new(x, y))).unwrap();
        session.handle_event(Event::PointerUp).unwrap();
    }

    fn read_saved(path: &Path) -> ndarray::Array2<u8> {
        npy::read_u8(std::fs::File::open(path).expect("saved mask")).expect("parse")
    }

    fn two_blank_images() -> Fixture {
        fixture(&[("img001.png", 10, 10), ("img002.png", 10, 10)])
    }

    #[test]
    fn test_initial_state() {
        let f = two_blank_images();
        let session = start(&f);
        assert_eq!(session.index(), 0);
        assert_eq!(session.image_count(), 2);
        assert_eq!(session.image().file_name, "img001.png");
        assert!(!session.eraser_on());
        assert_eq!(session.stroke_state(), StrokeState::Idle);
        assert_eq!(session.brush_radius(), DEFAULT_BRUSH_RADIUS);
        assert!(session.mask().is_blank());
    }

    #[test]
    fn test_mask_follows_image_dimensions() {
        let f = fixture(&[("a.png", 10, 10), ("b.png", 13, 6)]);
        let mut session = start(&f);
        assert_eq!(session.mask().dims(), (10, 10));

        press(&mut session, Command::Next);
        assert_eq!(session.mask().dims(), (6, 13));

        click(&mut session, 12, 5);
        press(&mut session, Command::Previous);
        assert_eq!(session.mask().dims(), (10, 10));
        press(&mut session, Command::Next);
        assert_eq!(session.mask().dims(), (6, 13));
        assert!(session.mask().is_annotated(12, 5));
    }

    #[test]
    fn test_dot_then_next_persists_mask() {
        let f = two_blank_images();
        let mut session = start(&f);

        click(&mut session, 5, 5);
        let outcome = press(&mut session, Command::Next);
        assert!(outcome.redraw);

        let grid = read_saved(&f.save_dir.join("img001.npy"));
        assert_eq!(grid.dim(), (10, 10));
        assert_eq!(grid[(5, 5)], 1);
        assert_eq!(grid[(5, 6)], 1);
        assert_eq!(grid[(4, 5)], 1);
        assert_eq!(grid[(0, 0)], 0);
        assert_eq!(grid[(9, 9)], 0);

        assert_eq!(session.index(), 1);
        assert_eq!(session.image().file_name, "img002.png");
        assert!(session.mask().is_blank());
    }

    #[test]
    fn test_quit_without_drawing_writes_nothing() {
        let f = two_blank_images();
        let mut session = start(&f);
        let outcome = press(&mut session, Command::Quit);
        assert!(outcome.quit);
        assert!(!f.save_dir.join("img001.npy").exists());
    }

    #[test]
    fn test_quit_saves_drawing() {
        let f = two_blank_images();
        let mut session = start(&f);
        click(&mut session, 2, 2);
        assert!(press(&mut session, Command::Quit).quit);
        assert_eq!(read_saved(&f.save_dir.join("img001.npy"))[(2, 2)], 1);
    }

    #[test]
    fn test_move_while_idle_is_ignored() {
        let f = two_blank_images();
        let mut session = start(&f);
        let outcome = session
            .handle_event(Event::PointerMove(PixelPos::new(3, 3)))
            .unwrap();
        assert!(!outcome.redraw);
        assert!(session.mask().is_blank());
    }

    #[test]
    fn test_drag_paints_and_release_stops() {
        let f = fixture(&[("wide.png", 40, 10)]);
        let mut session = start(&f);
        session.set_brush_radius(0);

        session.handle_event(Event::PointerDown(PixelPos::new(2, 5))).unwrap();
        assert_eq!(
            session.stroke_state(),
            StrokeState::Drawing { last: PixelPos::new(2, 5) }
        );
        let outcome = session
            .handle_event(Event::PointerMove(PixelPos::new(20, 5)))
            .unwrap();
        assert!(outcome.redraw);
        assert!((2..=20).all(|x| session.mask().is_annotated(x, 5)));

        session.handle_event(Event::PointerUp).unwrap();
        assert_eq!(session.stroke_state(), StrokeState::Idle);
        let count = session.mask().annotated_count();
        session.handle_event(Event::PointerMove(PixelPos::new(30, 5))).unwrap();
        assert_eq!(session.mask().annotated_count(), count);
    }

    #[test]
    fn test_eraser_toggles_and_erases() {
        let f = two_blank_images();
        let mut session = start(&f);
        click(&mut session, 5, 5);
        assert!(press(&mut session, Command::ToggleEraser).redraw);
        assert!(session.eraser_on());

        click(&mut session, 5, 5);
        assert!(session.mask().is_blank());

        press(&mut session, Command::ToggleEraser);
        assert!(!session.eraser_on());
    }

    #[test]
    fn test_navigation_resets_eraser() {
        let f = two_blank_images();
        let mut session = start(&f);
        press(&mut session, Command::ToggleEraser);
        press(&mut session, Command::Next);
        assert!(!session.eraser_on());
    }

    #[test]
    fn test_no_wraparound_at_ends() {
        let f = two_blank_images();
        let mut session = start(&f);

        let outcome = press(&mut session, Command::Previous);
        assert!(!outcome.redraw);
        assert_eq!(session.index(), 0);

        press(&mut session, Command::Next);
        let outcome = press(&mut session, Command::Next);
        assert!(!outcome.redraw);
        assert_eq!(session.index(), 1);
    }

    #[test]
    fn test_forward_then_back_restores_mask() {
        let f = two_blank_images();
        let mut session = start(&f);
        click(&mut session, 1, 8);
        click(&mut session, 7, 2);
        let before = session.mask().clone();

        press(&mut session, Command::Next);
        press(&mut session, Command::Previous);
        assert_eq!(session.mask(), &before);
    }

    #[test]
    fn test_reset_commits_on_navigation() {
        let f = two_blank_images();
        let mut session = start(&f);
        click(&mut session, 5, 5);
        press(&mut session, Command::Next);
        press(&mut session, Command::Previous);
        assert!(!session.mask().is_blank());

        press(&mut session, Command::ResetMask);
        assert!(session.mask().is_blank());
        assert_eq!(session.mask().dims(), (10, 10));
        // Still on disk until the next save
        assert_eq!(read_saved(&f.save_dir.join("img001.npy"))[(5, 5)], 1);

        press(&mut session, Command::Next);
        let grid = read_saved(&f.save_dir.join("img001.npy"));
        assert!(grid.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_corrupt_mask_falls_back_to_blank() {
        let f = two_blank_images();
        MaskStore::new(&f.save_dir)
            .save("img002.png", &{
                let mut m = Mask::zeros(3, 3);
                m.set(1, 1, ANNOTATED);
                m
            })
            .unwrap();

        let mut session = start(&f);
        let outcome = press(&mut session, Command::Next);
        assert!(matches!(outcome.warning, Some(AnnotateError::CorruptMask { .. })));
        assert_eq!(session.index(), 1);
        assert_eq!(session.mask().dims(), (10, 10));
        assert!(session.mask().is_blank());
    }

    #[test]
    fn test_failed_save_keeps_current_image() {
        let f = two_blank_images();
        let mut session = start(&f);
        std::fs::write(&f.save_dir, b"not a directory").unwrap();

        click(&mut session, 4, 4);
        let err = session
            .handle_event(Event::Command(Command::Next))
            .unwrap_err();
        assert!(matches!(err, AnnotateError::Io { .. }));
        assert_eq!(session.index(), 0);
        assert!(session.mask().is_annotated(4, 4));

        let err = session
            .handle_event(Event::Command(Command::Quit))
            .unwrap_err();
        assert!(matches!(err, AnnotateError::Io { .. }));
    }

    #[test]
    fn test_undecodable_neighbor_keeps_current_image() {
        let f = two_blank_images();
        std::fs::write(f.img_dir.join("img003.png"), b"broken").unwrap();
        let mut session = start(&f);
        press(&mut session, Command::Next);

        click(&mut session, 3, 3);
        let err = session
            .handle_event(Event::Command(Command::Next))
            .unwrap_err();
        assert!(matches!(err, AnnotateError::Decode { .. }));
        assert_eq!(session.index(), 1);
        assert!(session.mask().is_annotated(3, 3));
    }

    #[test]
    fn test_drawn_then_erased_without_file_is_skipped() {
        let f = two_blank_images();
        let mut session = start(&f);
        click(&mut session, 5, 5);
        press(&mut session, Command::ToggleEraser);
        click(&mut session, 5, 5);
        assert!(session.mask().is_blank());

        press(&mut session, Command::Next);
        assert!(!f.save_dir.join("img001.npy").exists());
    }

    #[test]
    fn test_leaving_image_with_saved_mask_rewrites_it() {
        let f = two_blank_images();
        let mut session = start(&f);
        press(&mut session, Command::Next);
        click(&mut session, 7, 7);
        press(&mut session, Command::Previous);

        let path = f.save_dir.join("img002.npy");
        std::fs::write(&path, b"").unwrap();
        // Empty file is unusable, so the session falls back to blank and
        // commits that blank grid when leaving
        let outcome = press(&mut session, Command::Next);
        assert!(matches!(outcome.warning, Some(AnnotateError::CorruptMask { .. })));
        press(&mut session, Command::Previous);

        let grid = read_saved(&path);
        assert_eq!(grid.dim(), (10, 10));
        assert!(grid.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_oversized_mask_header_falls_back_to_blank() {
        let f = two_blank_images();
        std::fs::create_dir(&f.save_dir).unwrap();
        let header = "{'descr': '|u1', 'fortran_order': False, 'shape': (100000000, 100000000), }\n";
        let mut bytes = b"\x93NUMPY\x01\x00".to_vec();
        bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
        bytes.extend_from_slice(header.as_bytes());
        std::fs::write(f.save_dir.join("img002.npy"), bytes).unwrap();

        let mut session = start(&f);
        click(&mut session, 2, 2);
        let outcome = press(&mut session, Command::Next);
        assert!(matches!(outcome.warning, Some(AnnotateError::CorruptMask { .. })));
        assert_eq!(session.index(), 1);
        assert_eq!(session.mask().dims(), (10, 10));
        assert_eq!(read_saved(&f.save_dir.join("img001.npy"))[(2, 2)], 1);
    }

    #[test]
    fn test_brush_radius_is_capped() {
        let f = two_blank_images();
        let mut session = start(&f);
        session.set_brush_radius(500);
        assert_eq!(session.brush_radius(), MAX_BRUSH_RADIUS);
    }

    #[test]
    fn test_frame_matches_image_size() {
        let f = fixture(&[("a.png", 30, 20)]);
        let session = start(&f);
        assert_eq!(session.frame().dimensions(), (30, 20));
    }
}
