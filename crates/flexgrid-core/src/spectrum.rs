//! Per-link spectrum state and the first-fit allocator.
//!
//! [`Spectrum`] is the single authoritative record of which slots are occupied on which link. It
//! also carries an impairment overlay used to simulate failures. Allocation never touches the
//! overlay, and the availability view is derived from the overlay alone.
//!
//! Reads take `&self` and writes take `&mut self`, so a search followed by a commit is serialized
//! by the borrow checker. [`Spectrum::reserve`] performs both as one step.

use std::ops::Range;

use fixedbitset::FixedBitSet;

use crate::network::{LinkId, Network, Path};

/// A contiguous range of slots `[start, start + width)`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, derive_new::new,
)]
pub struct SlotWindow {
    pub start: usize,
    pub width: usize,
}

impl SlotWindow {
    /// One past the last slot of the window.
    pub fn end(&self) -> usize {
        self.start + self.width
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    /// The window of `width` slots that begins where `self` ends.
    pub fn followed_by(&self, width: usize) -> SlotWindow {
        SlotWindow::new(self.end(), width)
    }
}

impl std::fmt::Display for SlotWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end())
    }
}

/// Slot occupancy and impairments for every link of a network.
#[derive(Debug, Clone)]
pub struct Spectrum {
    nr_slots: usize,
    occupancy: Vec<FixedBitSet>,
    impairments: Vec<FixedBitSet>,
}

impl Spectrum {
    /// An all-free, unimpaired spectrum for `network`.
    pub fn new(network: &Network) -> Self {
        Self::with_links(network.nr_links(), network.nr_slots())
    }

    pub fn with_links(nr_links: usize, nr_slots: usize) -> Self {
        Self {
            nr_slots,
            occupancy: vec![FixedBitSet::with_capacity(nr_slots); nr_links],
            impairments: vec![FixedBitSet::with_capacity(nr_slots); nr_links],
        }
    }

    pub fn nr_slots(&self) -> usize {
        self.nr_slots
    }

    pub fn nr_links(&self) -> usize {
        self.occupancy.len()
    }

    /// Occupied slots of `link`.
    pub fn occupancy(&self, link: LinkId) -> Option<&FixedBitSet> {
        self.occupancy.get(link.index())
    }

    /// Total number of occupied slots over all links.
    pub fn occupied_slots(&self) -> usize {
        self.occupancy.iter().map(|b| b.count_ones(..)).sum()
    }

    /// The lowest window of `width` slots that is free on every link of `path`, if any.
    pub fn first_fit(&self, path: &Path, width: usize) -> Result<Option<SlotWindow>, SpectrumError> {
        if width == 0 {
            return Err(SpectrumError::ZeroWidth);
        }
        let busy = self.busy_slots(path)?;
        let mut run = 0;
        for slot in 0..self.nr_slots {
            if busy.contains(slot) {
                run = 0;
            } else {
                run += 1;
                if run == width {
                    return Ok(Some(SlotWindow::new(slot + 1 - width, width)));
                }
            }
        }
        Ok(None)
    }

    /// The lowest offset `s` such that `[s, s + primary_width)` is free on `primary` and
    /// `[s + primary_width, s + primary_width + backup_width)` is free on `backup`. Returns the two
    /// windows, primary first.
    pub fn first_fit_back_to_back(
        &self,
        primary: &Path,
        primary_width: usize,
        backup: &Path,
        backup_width: usize,
    ) -> Result<Option<(SlotWindow, SlotWindow)>, SpectrumError> {
        if primary_width == 0 || backup_width == 0 {
            return Err(SpectrumError::ZeroWidth);
        }
        let busy_primary = self.busy_slots(primary)?;
        let busy_backup = self.busy_slots(backup)?;
        let total = primary_width + backup_width;
        if total > self.nr_slots {
            return Ok(None);
        }
        for start in 0..=(self.nr_slots - total) {
            let p = SlotWindow::new(start, primary_width);
            let b = p.followed_by(backup_width);
            if busy_primary.count_ones(p.range()) == 0 && busy_backup.count_ones(b.range()) == 0 {
                return Ok(Some((p, b)));
            }
        }
        Ok(None)
    }

    /// Returns true if `window` is free on every link of `path`.
    pub fn is_free(&self, path: &Path, window: SlotWindow) -> Result<bool, SpectrumError> {
        self.check_window(window)?;
        let busy = self.busy_slots(path)?;
        Ok(busy.count_ones(window.range()) == 0)
    }

    /// Returns true if no link of `path` is impaired anywhere inside `window`.
    pub fn is_path_available(&self, path: &Path, window: SlotWindow) -> Result<bool, SpectrumError> {
        self.check_window(window)?;
        self.none_impaired(path.links().iter().copied(), window)
    }

    /// Availability of `path` inside `window` over the links `scope` selects.
    ///
    /// [`AvailabilityScope::PathLinks`] is [`Spectrum::is_path_available`].
    /// [`AvailabilityScope::AdjacentLinks`] additionally requires every link attached to a path
    /// node other than the destination to be unimpaired inside `window`.
    pub fn is_available(
        &self,
        network: &Network,
        path: &Path,
        window: SlotWindow,
        scope: AvailabilityScope,
    ) -> Result<bool, SpectrumError> {
        match scope {
            AvailabilityScope::PathLinks => self.is_path_available(path, window),
            AvailabilityScope::AdjacentLinks => {
                self.check_window(window)?;
                let (_, upstream) = match path.nodes().split_last() {
                    Some(split) => split,
                    None => return Ok(true),
                };
                let adjacent = upstream
                    .iter()
                    .flat_map(move |&node| network.incident_links(node));
                self.none_impaired(path.links().iter().copied().chain(adjacent), window)
            }
        }
    }

    /// Marks `window` occupied on every link of `path`. Fails without modifying anything if any
    /// slot of the window is already occupied.
    pub fn occupy(&mut self, path: &Path, window: SlotWindow) -> Result<(), SpectrumError> {
        self.check_window(window)?;
        for &link in path.links() {
            let bits = self.link_bits(link)?;
            if let Some(slot) = window.range().find(|&s| bits.contains(s)) {
                return Err(SpectrumError::Overlap { link, slot });
            }
        }
        for &link in path.links() {
            self.occupancy[link.index()].set_range(window.range(), true);
        }
        Ok(())
    }

    /// Marks `window` free on every link of `path`. Fails without modifying anything if any slot of
    /// the window is not occupied.
    pub fn release(&mut self, path: &Path, window: SlotWindow) -> Result<(), SpectrumError> {
        self.check_window(window)?;
        for &link in path.links() {
            let bits = self.link_bits(link)?;
            if let Some(slot) = window.range().find(|&s| !bits.contains(s)) {
                return Err(SpectrumError::NotReserved { link, slot });
            }
        }
        for &link in path.links() {
            self.occupancy[link.index()].set_range(window.range(), false);
        }
        Ok(())
    }

    /// First-fit followed by occupy, as one step.
    pub fn reserve(&mut self, path: &Path, width: usize) -> Result<Option<SlotWindow>, SpectrumError> {
        let window = self.first_fit(path, width)?;
        if let Some(window) = window {
            self.occupy(path, window)?;
        }
        Ok(window)
    }

    /// Frees every slot on every link. Impairments are kept.
    pub fn clear(&mut self) {
        for bits in &mut self.occupancy {
            bits.clear();
        }
    }

    /// Marks `window` of `link` as impaired.
    pub fn impair(&mut self, link: LinkId, window: SlotWindow) -> Result<(), SpectrumError> {
        self.check_window(window)?;
        let bits = self
            .impairments
            .get_mut(link.index())
            .ok_or(SpectrumError::UnknownLink(link))?;
        bits.set_range(window.range(), true);
        Ok(())
    }

    /// Impairs every slot of `link`.
    pub fn fail_link(&mut self, link: LinkId) -> Result<(), SpectrumError> {
        self.impair(link, SlotWindow::new(0, self.nr_slots))
    }

    pub fn clear_impairments(&mut self) {
        for bits in &mut self.impairments {
            bits.clear();
        }
    }

    fn check_window(&self, window: SlotWindow) -> Result<(), SpectrumError> {
        if window.width == 0 {
            return Err(SpectrumError::ZeroWidth);
        }
        if window.end() > self.nr_slots {
            return Err(SpectrumError::OutOfRange {
                window,
                nr_slots: self.nr_slots,
            });
        }
        Ok(())
    }

    fn link_bits(&self, link: LinkId) -> Result<&FixedBitSet, SpectrumError> {
        self.occupancy
            .get(link.index())
            .ok_or(SpectrumError::UnknownLink(link))
    }

    fn none_impaired(
        &self,
        links: impl IntoIterator<Item = LinkId>,
        window: SlotWindow,
    ) -> Result<bool, SpectrumError> {
        for link in links {
            let impaired = self
                .impairments
                .get(link.index())
                .ok_or(SpectrumError::UnknownLink(link))?;
            if impaired.count_ones(window.range()) > 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }

    // Union of the occupancy of every link on `path`
    fn busy_slots(&self, path: &Path) -> Result<FixedBitSet, SpectrumError> {
        let mut busy = FixedBitSet::with_capacity(self.nr_slots);
        for &link in path.links() {
            busy.union_with(self.link_bits(link)?);
        }
        Ok(busy)
    }
}

/// Which links an availability check looks at.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AvailabilityScope {
    /// The links of the path.
    #[default]
    PathLinks,
    /// The links of the path and every link attached to a path node other than the destination.
    AdjacentLinks,
}

/// Spectrum contract violation.
#[derive(Debug, thiserror::Error)]
pub enum SpectrumError {
    #[error("slot windows must be at least one slot wide")]
    ZeroWidth,

    #[error("window {window} exceeds the {nr_slots}-slot spectrum")]
    OutOfRange { window: SlotWindow, nr_slots: usize },

    #[error("slot {slot} of link {} is already occupied", .link.index())]
    Overlap { link: LinkId, slot: usize },

    #[error("slot {slot} of link {} is not occupied", .link.index())]
    NotReserved { link: LinkId, slot: usize },

    #[error("link {} is not part of the spectrum", .0.index())]
    UnknownLink(LinkId),
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::*;
    use crate::network::NodeId;
    use crate::testing;

    fn setup(nr_slots: usize) -> anyhow::Result<(Network, Spectrum)> {
        let (nodes, links) = testing::square_config();
        let network = Network::new(&nodes, &links, nr_slots).context("failed to create network")?;
        let spectrum = Spectrum::new(&network);
        Ok((network, spectrum))
    }

    fn path(network: &Network, ids: &[usize]) -> anyhow::Result<Path> {
        let ids = ids.iter().map(|&i| NodeId::new(i)).collect::<Vec<_>>();
        network.path(&ids).context("invalid path")
    }

    #[test]
    fn first_fit_starts_at_zero() -> anyhow::Result<()> {
        let (network, spectrum) = setup(16)?;
        let p = path(&network, &[0, 1, 3])?;
        assert_eq!(spectrum.first_fit(&p, 4)?, Some(SlotWindow::new(0, 4)));
        Ok(())
    }

    #[test]
    fn first_fit_respects_every_link() -> anyhow::Result<()> {
        let (network, mut spectrum) = setup(16)?;
        let p01 = path(&network, &[0, 1])?;
        let p13 = path(&network, &[1, 3])?;
        let p013 = path(&network, &[0, 1, 3])?;
        spectrum.occupy(&p01, SlotWindow::new(0, 2))?;
        spectrum.occupy(&p13, SlotWindow::new(3, 2))?;
        // Slots 0-1 busy on 0-1, slots 3-4 busy on 1-3: the first 3-wide gap is at 5
        assert_eq!(spectrum.first_fit(&p013, 3)?, Some(SlotWindow::new(5, 3)));
        assert_eq!(spectrum.first_fit(&p013, 1)?, Some(SlotWindow::new(2, 1)));
        Ok(())
    }

    #[test]
    fn first_fit_exhaustion_is_none() -> anyhow::Result<()> {
        let (network, mut spectrum) = setup(8)?;
        let p = path(&network, &[0, 1])?;
        assert_eq!(spectrum.first_fit(&p, 9)?, None);
        spectrum.occupy(&p, SlotWindow::new(2, 1))?;
        spectrum.occupy(&p, SlotWindow::new(5, 1))?;
        assert_eq!(spectrum.first_fit(&p, 3)?, None);
        assert_eq!(spectrum.first_fit(&p, 2)?, Some(SlotWindow::new(0, 2)));
        Ok(())
    }

    #[test]
    fn zero_width_fails() -> anyhow::Result<()> {
        let (network, mut spectrum) = setup(8)?;
        let p = path(&network, &[0, 1])?;
        assert!(matches!(spectrum.first_fit(&p, 0), Err(SpectrumError::ZeroWidth)));
        assert!(matches!(
            spectrum.occupy(&p, SlotWindow::new(0, 0)),
            Err(SpectrumError::ZeroWidth)
        ));
        Ok(())
    }

    #[test]
    fn occupy_out_of_range_fails() -> anyhow::Result<()> {
        let (network, mut spectrum) = setup(8)?;
        let p = path(&network, &[0, 1])?;
        let res = spectrum.occupy(&p, SlotWindow::new(6, 3));
        assert!(matches!(res, Err(SpectrumError::OutOfRange { .. })));
        assert_eq!(spectrum.occupied_slots(), 0);
        Ok(())
    }

    #[test]
    fn overlapping_occupy_fails_without_side_effects() -> anyhow::Result<()> {
        let (network, mut spectrum) = setup(8)?;
        let p01 = path(&network, &[0, 1])?;
        let p013 = path(&network, &[0, 1, 3])?;
        spectrum.occupy(&p01, SlotWindow::new(2, 2))?;
        let res = spectrum.occupy(&p013, SlotWindow::new(0, 3));
        assert!(matches!(res, Err(SpectrumError::Overlap { slot: 2, .. })));
        // Link 1-3 was left untouched
        assert_eq!(spectrum.occupied_slots(), 2);
        Ok(())
    }

    #[test]
    fn release_requires_occupancy() -> anyhow::Result<()> {
        let (network, mut spectrum) = setup(8)?;
        let p = path(&network, &[0, 1, 3])?;
        let w = spectrum.reserve(&p, 3)?.context("no window")?;
        assert_eq!(spectrum.occupied_slots(), 6);
        let res = spectrum.release(&p, SlotWindow::new(1, 3));
        assert!(matches!(res, Err(SpectrumError::NotReserved { slot: 3, .. })));
        assert_eq!(spectrum.occupied_slots(), 6);
        spectrum.release(&p, w)?;
        assert_eq!(spectrum.occupied_slots(), 0);
        Ok(())
    }

    #[test]
    fn clear_frees_everything_and_keeps_impairments() -> anyhow::Result<()> {
        let (network, mut spectrum) = setup(8)?;
        let p = path(&network, &[0, 2, 3])?;
        spectrum.reserve(&p, 4)?;
        spectrum.fail_link(p.links()[0])?;
        spectrum.clear();
        assert_eq!(spectrum.occupied_slots(), 0);
        assert!(!spectrum.is_path_available(&p, SlotWindow::new(0, 1))?);
        Ok(())
    }

    #[test]
    fn availability_follows_the_overlay_only() -> anyhow::Result<()> {
        let (network, mut spectrum) = setup(16)?;
        let p = path(&network, &[0, 1, 3])?;
        let other = path(&network, &[0, 2, 3])?;
        spectrum.reserve(&p, 4)?;
        // Occupied but not impaired is still available
        assert!(spectrum.is_path_available(&p, SlotWindow::new(0, 4))?);
        spectrum.impair(p.links()[1], SlotWindow::new(6, 2))?;
        assert!(spectrum.is_path_available(&p, SlotWindow::new(0, 6))?);
        assert!(!spectrum.is_path_available(&p, SlotWindow::new(4, 3))?);
        assert!(spectrum.is_path_available(&other, SlotWindow::new(4, 3))?);
        spectrum.clear_impairments();
        assert!(spectrum.is_path_available(&p, SlotWindow::new(4, 3))?);
        Ok(())
    }

    #[test]
    fn adjacent_scope_sees_links_beside_the_path() -> anyhow::Result<()> {
        let (network, mut spectrum) = setup(16)?;
        let p = path(&network, &[0, 1, 3])?;
        let window = SlotWindow::new(0, 2);
        let beside_src = network
            .link_between(NodeId::new(0), NodeId::new(2))
            .context("missing 0-2")?;
        spectrum.impair(beside_src, SlotWindow::new(1, 1))?;
        assert!(spectrum.is_available(&network, &p, window, AvailabilityScope::PathLinks)?);
        assert!(!spectrum.is_available(&network, &p, window, AvailabilityScope::AdjacentLinks)?);
        assert!(spectrum.is_available(
            &network,
            &p,
            SlotWindow::new(2, 4),
            AvailabilityScope::AdjacentLinks
        )?);

        // Links attached only to the destination are not checked
        spectrum.clear_impairments();
        let beside_dst = network
            .link_between(NodeId::new(2), NodeId::new(3))
            .context("missing 2-3")?;
        spectrum.fail_link(beside_dst)?;
        assert!(spectrum.is_available(&network, &p, window, AvailabilityScope::AdjacentLinks)?);
        Ok(())
    }

    #[test]
    fn back_to_back_windows_are_adjacent() -> anyhow::Result<()> {
        let (network, mut spectrum) = setup(16)?;
        let primary = path(&network, &[0, 1, 3])?;
        let backup = path(&network, &[0, 2, 3])?;
        spectrum.occupy(&backup, SlotWindow::new(2, 1))?;
        let (p, b) = spectrum
            .first_fit_back_to_back(&primary, 2, &backup, 2)?
            .context("no windows")?;
        assert_eq!(p, SlotWindow::new(1, 2));
        assert_eq!(b, SlotWindow::new(3, 2));
        Ok(())
    }

    #[test]
    fn occupied_slot_count_is_per_link() -> anyhow::Result<()> {
        let (network, mut spectrum) = setup(16)?;
        let p = path(&network, &[0, 1, 3])?;
        spectrum.reserve(&p, 2)?;
        let counts = network
            .link_ids()
            .map(|l| spectrum.occupancy(l).map(|b| b.count_ones(..)).unwrap_or(0))
            .collect::<Vec<_>>();
        insta::assert_yaml_snapshot!(counts, @r###"
        ---
        - 2
        - 2
        - 0
        - 0
        "###);
        Ok(())
    }
}
