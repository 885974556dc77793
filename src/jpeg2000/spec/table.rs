//! Four level override table for tile-component parameters.

use std::collections::HashMap;
use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::{ConfigError, ContractViolation};

use super::index_set::IndexSet;

/// Layer that is authoritative for a tile-component cell, in increasing priority.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, IntoPrimitive, TryFromPrimitive,
)]
#[repr(u8)]
pub enum SpecTag {
    #[default]
    Default = 0,
    ComponentDefault = 1,
    TileDefault = 2,
    TileComponent = 3,
}

/// Which setters a table accepts. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecScope {
    TileOnly,
    ComponentOnly,
    TileAndComponent,
}

impl SpecScope {
    pub fn allows_tiles(self) -> bool {
        self != SpecScope::ComponentOnly
    }

    pub fn allows_components(self) -> bool {
        self != SpecScope::TileOnly
    }
}

impl fmt::Display for SpecScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecScope::TileOnly => write!(f, "tile only"),
            SpecScope::ComponentOnly => write!(f, "component only"),
            SpecScope::TileAndComponent => write!(f, "tile-component"),
        }
    }
}

/// Cells an option value applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecTarget {
    Default,
    Tiles(IndexSet),
    Components(IndexSet),
    TileComponents(IndexSet, IndexSet),
}

/// Override table resolving a value for every (tile, component) pair.
///
/// Values come from, in increasing priority: the global default, a
/// per-component default, a per-tile default and an explicit per
/// tile-component value. Tags are only ever promoted, so a later tile or
/// component default never hides an explicit tile-component value.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecTable<V> {
    num_tiles: usize,
    num_components: usize,
    scope: SpecScope,
    default: Option<V>,
    component_default: Vec<Option<V>>,
    tile_default: Vec<Option<V>>,
    // A `None` entry is a demoted value left in place by `normalize_defaults`.
    tile_component: HashMap<(usize, usize), Option<V>>,
    tags: Vec<SpecTag>,
}

impl<V> SpecTable<V> {
    pub fn num_tiles(&self) -> usize {
        self.num_tiles
    }

    pub fn num_components(&self) -> usize {
        self.num_components
    }

    pub fn scope(&self) -> SpecScope {
        self.scope
    }

    pub fn default(&self) -> Option<&V> {
        self.default.as_ref()
    }

    /// Component default, or the global default when none was set.
    pub fn component_default(&self, c: usize) -> Result<Option<&V>, ContractViolation> {
        if !self.scope.allows_components() {
            return Err(ContractViolation::ScopeViolation {
                operation: "component_default",
                scope: self.scope,
            });
        }
        self.check_component(c)?;
        Ok(self.component_default[c].as_ref().or(self.default.as_ref()))
    }

    /// Tile default, or the global default when none was set.
    pub fn tile_default(&self, t: usize) -> Result<Option<&V>, ContractViolation> {
        if !self.scope.allows_tiles() {
            return Err(ContractViolation::ScopeViolation {
                operation: "tile_default",
                scope: self.scope,
            });
        }
        self.check_tile(t)?;
        Ok(self.tile_default[t].as_ref().or(self.default.as_ref()))
    }

    /// Resolve the value of a cell. `None` only while no layer, including the
    /// global default, holds a value for it.
    pub fn get(&self, t: usize, c: usize) -> Option<&V> {
        if t >= self.num_tiles || c >= self.num_components {
            return None;
        }
        let layer = match self.tags[t * self.num_components + c] {
            SpecTag::Default => None,
            SpecTag::ComponentDefault => self.component_default[c].as_ref(),
            SpecTag::TileDefault => self.tile_default[t].as_ref(),
            SpecTag::TileComponent => self.tile_component.get(&(t, c)).and_then(Option::as_ref),
        };
        layer.or(self.default.as_ref())
    }

    /// Like `get`, reporting an unresolved cell as a contract violation.
    pub fn resolve(
        &self,
        spec: &'static str,
        t: usize,
        c: usize,
    ) -> Result<&V, ContractViolation> {
        self.check_tile(t)?;
        self.check_component(c)?;
        self.get(t, c).ok_or(ContractViolation::Unresolved {
            spec,
            tile: t,
            component: c,
        })
    }

    pub fn tag(&self, t: usize, c: usize) -> SpecTag {
        self.tags[t * self.num_components + c]
    }

    pub fn is_tile_specified(&self, t: usize) -> bool {
        self.tile_default.get(t).is_some_and(Option::is_some)
    }

    pub fn is_component_specified(&self, c: usize) -> bool {
        self.component_default.get(c).is_some_and(Option::is_some)
    }

    pub fn is_tile_component_specified(&self, t: usize, c: usize) -> bool {
        self.tile_component
            .get(&(t, c))
            .is_some_and(Option::is_some)
    }

    /// Every resolved cell value in tile-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Option<&V>)> + '_ {
        (0..self.num_tiles)
            .flat_map(move |t| (0..self.num_components).map(move |c| (t, c, self.get(t, c))))
    }

    fn check_tile(&self, t: usize) -> Result<(), ContractViolation> {
        if t >= self.num_tiles {
            return Err(ContractViolation::TileOutOfRange {
                tile: t,
                num_tiles: self.num_tiles,
            });
        }
        Ok(())
    }

    fn check_component(&self, c: usize) -> Result<(), ContractViolation> {
        if c >= self.num_components {
            return Err(ContractViolation::ComponentOutOfRange {
                component: c,
                num_components: self.num_components,
            });
        }
        Ok(())
    }
}

impl<V: Clone> SpecTable<V> {
    pub fn new(num_tiles: usize, num_components: usize, scope: SpecScope) -> Self {
        Self {
            num_tiles,
            num_components,
            scope,
            default: None,
            component_default: vec![None; num_components],
            tile_default: vec![None; num_tiles],
            tile_component: HashMap::new(),
            tags: vec![SpecTag::Default; num_tiles * num_components],
        }
    }

    /// Table holding nothing but a global default.
    pub fn with_default(
        num_tiles: usize,
        num_components: usize,
        scope: SpecScope,
        value: V,
    ) -> Self {
        let mut table = Self::new(num_tiles, num_components, scope);
        table.set_default(value);
        table
    }

    pub fn set_default(&mut self, value: V) {
        self.default = Some(value);
    }

    pub fn set_component_default(&mut self, c: usize, value: V) -> Result<(), ContractViolation> {
        if !self.scope.allows_components() {
            return Err(ContractViolation::ScopeViolation {
                operation: "set_component_default",
                scope: self.scope,
            });
        }
        self.check_component(c)?;
        for t in 0..self.num_tiles {
            let tag = &mut self.tags[t * self.num_components + c];
            if *tag < SpecTag::ComponentDefault {
                *tag = SpecTag::ComponentDefault;
            }
        }
        self.component_default[c] = Some(value);
        Ok(())
    }

    pub fn set_tile_default(&mut self, t: usize, value: V) -> Result<(), ContractViolation> {
        if !self.scope.allows_tiles() {
            return Err(ContractViolation::ScopeViolation {
                operation: "set_tile_default",
                scope: self.scope,
            });
        }
        self.check_tile(t)?;
        let row = t * self.num_components;
        for tag in &mut self.tags[row..row + self.num_components] {
            if *tag < SpecTag::TileDefault {
                *tag = SpecTag::TileDefault;
            }
        }
        self.tile_default[t] = Some(value);
        Ok(())
    }

    pub fn set_tile_component(
        &mut self,
        t: usize,
        c: usize,
        value: V,
    ) -> Result<(), ContractViolation> {
        if self.scope != SpecScope::TileAndComponent {
            return Err(ContractViolation::ScopeViolation {
                operation: "set_tile_component",
                scope: self.scope,
            });
        }
        self.check_tile(t)?;
        self.check_component(c)?;
        self.tags[t * self.num_components + c] = SpecTag::TileComponent;
        self.tile_component.insert((t, c), Some(value));
        Ok(())
    }

    /// Store `value` in every cell selected by `target`.
    pub fn apply(&mut self, target: &SpecTarget, value: V) -> Result<(), ContractViolation> {
        match target {
            SpecTarget::Default => self.set_default(value),
            SpecTarget::Tiles(tiles) => {
                for t in tiles.iter() {
                    self.set_tile_default(t, value.clone())?;
                }
            }
            SpecTarget::Components(components) => {
                for c in components.iter() {
                    self.set_component_default(c, value.clone())?;
                }
            }
            SpecTarget::TileComponents(tiles, components) => {
                for t in tiles.iter() {
                    for c in components.iter() {
                        self.set_tile_component(t, c, value.clone())?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Remap tile indexed data under a 90 degree rotation of the tile grid.
    ///
    /// `new_grid` is the (columns, rows) shape after rotation; the grid
    /// before rotation is therefore `rows` columns wide. Component indexed
    /// data is left untouched.
    pub fn rotate_90(&mut self, new_grid: (usize, usize)) -> Result<(), ContractViolation> {
        let (an_x, an_y) = new_grid;
        if an_x * an_y != self.num_tiles {
            return Err(ContractViolation::TileGridMismatch {
                width: an_x,
                height: an_y,
                num_tiles: self.num_tiles,
            });
        }
        // Grid before rotation.
        let (bn_x, bn_y) = (an_y, an_x);
        let rotated = |bt: usize| {
            let (bx, by) = (bt % bn_x, bt / bn_x);
            let (ax, ay) = (bn_y - by - 1, bx);
            ay * an_x + ax
        };

        let nc = self.num_components;
        let mut tags = vec![SpecTag::Default; self.tags.len()];
        let mut tile_default = vec![None; self.num_tiles];
        for bt in 0..self.num_tiles {
            let at = rotated(bt);
            tags[at * nc..(at + 1) * nc].copy_from_slice(&self.tags[bt * nc..(bt + 1) * nc]);
            tile_default[at] = self.tile_default[bt].take();
        }
        self.tags = tags;
        self.tile_default = tile_default;

        self.tile_component = self
            .tile_component
            .drain()
            .map(|((bt, c), v)| ((rotated(bt), c), v))
            .collect();
        Ok(())
    }

    /// Install a global default once all user overrides have been applied.
    ///
    /// Does nothing if a default exists. If some cells are still tagged
    /// `Default`, the value produced by `fallback` becomes the default.
    /// Otherwise every cell was covered explicitly: the value of cell (0, 0)
    /// becomes the default and the layer that produced it is demoted.
    pub fn normalize_defaults<F>(&mut self, fallback: F) -> Result<(), ConfigError>
    where
        F: FnOnce() -> Result<V, ConfigError>,
    {
        if self.default.is_some() {
            return Ok(());
        }
        let unspecified = self.tags.iter().filter(|&&t| t == SpecTag::Default).count();
        if unspecified != 0 {
            self.default = Some(fallback()?);
            return Ok(());
        }
        if self.tags.is_empty() {
            return Ok(());
        }

        self.default = self.get(0, 0).cloned();
        let nc = self.num_components;
        match self.tags[0] {
            SpecTag::TileDefault => {
                for tag in &mut self.tags[..nc] {
                    if *tag == SpecTag::TileDefault {
                        *tag = SpecTag::Default;
                    }
                }
                self.tile_default[0] = None;
            }
            SpecTag::ComponentDefault => {
                for t in 0..self.num_tiles {
                    let tag = &mut self.tags[t * nc];
                    if *tag == SpecTag::ComponentDefault {
                        *tag = SpecTag::Default;
                    }
                }
                self.component_default[0] = None;
            }
            SpecTag::TileComponent => {
                self.tags[0] = SpecTag::Default;
                self.tile_component.insert((0, 0), None);
            }
            SpecTag::Default => {}
        }
        Ok(())
    }

}

impl<V: PartialOrd> SpecTable<V> {
    /// Largest value resolved by any tile-component.
    pub fn max_value(&self) -> Option<&V> {
        self.cells()
            .filter_map(|(_, _, v)| v)
            .fold(None, |acc: Option<&V>, v| match acc {
                Some(a) if a >= v => Some(a),
                _ => Some(v),
            })
    }

    /// Smallest value resolved by any tile-component.
    pub fn min_value(&self) -> Option<&V> {
        self.cells()
            .filter_map(|(_, _, v)| v)
            .fold(None, |acc: Option<&V>, v| match acc {
                Some(a) if a <= v => Some(a),
                _ => Some(v),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_table_is_unresolved() {
        let table: SpecTable<i32> = SpecTable::new(2, 2, SpecScope::TileAndComponent);
        assert_eq!(table.get(0, 0), None);
        assert_eq!(table.tag(1, 1), SpecTag::Default);
        assert!(matches!(
            table.resolve("test", 0, 0),
            Err(ContractViolation::Unresolved { .. })
        ));
    }

    #[test]
    fn test_tile_default_then_tile_component() {
        let mut table = SpecTable::new(3, 2, SpecScope::TileAndComponent);
        table.set_default("none");
        table.set_tile_default(1, "rct").unwrap();
        table.set_tile_component(1, 0, "ict").unwrap();

        assert_eq!(table.get(1, 0), Some(&"ict"));
        assert_eq!(table.get(1, 1), Some(&"rct"));
        assert_eq!(table.get(0, 0), table.default());
        assert_eq!(table.tag(1, 0), SpecTag::TileComponent);
        assert_eq!(table.tag(1, 1), SpecTag::TileDefault);
    }

    #[test]
    fn test_tags_are_never_downgraded() {
        let mut table = SpecTable::new(2, 2, SpecScope::TileAndComponent);
        table.set_default(0);
        table.set_tile_component(0, 1, 7).unwrap();
        table.set_tile_default(0, 5).unwrap();
        table.set_component_default(1, 3).unwrap();

        assert_eq!(table.get(0, 1), Some(&7));
        assert_eq!(table.get(0, 0), Some(&5));
        assert_eq!(table.get(1, 1), Some(&3));
        assert_eq!(table.get(1, 0), Some(&0));
        assert_eq!(table.tag(0, 0), SpecTag::TileDefault);
    }

    #[test]
    fn test_component_default_does_not_override_tile_default() {
        let mut table = SpecTable::new(2, 2, SpecScope::TileAndComponent);
        table.set_tile_default(0, 1).unwrap();
        table.set_component_default(0, 2).unwrap();
        assert_eq!(table.get(0, 0), Some(&1));
        assert_eq!(table.get(1, 0), Some(&2));
    }

    #[test]
    fn test_scope_violations() {
        let mut tiles: SpecTable<i32> = SpecTable::new(2, 3, SpecScope::TileOnly);
        assert_eq!(
            tiles.set_component_default(0, 1),
            Err(ContractViolation::ScopeViolation {
                operation: "set_component_default",
                scope: SpecScope::TileOnly
            })
        );
        assert!(tiles.set_tile_component(0, 0, 1).is_err());
        assert!(tiles.component_default(0).is_err());

        let mut comps: SpecTable<i32> = SpecTable::new(2, 3, SpecScope::ComponentOnly);
        assert!(comps.set_tile_default(0, 1).is_err());
        assert!(comps.set_component_default(2, 1).is_ok());
    }

    #[test]
    fn test_index_bounds() {
        let mut table: SpecTable<i32> = SpecTable::new(2, 3, SpecScope::TileAndComponent);
        assert_eq!(
            table.set_tile_default(2, 1),
            Err(ContractViolation::TileOutOfRange {
                tile: 2,
                num_tiles: 2
            })
        );
        assert!(table.set_component_default(3, 1).is_err());
        assert_eq!(table.get(5, 0), None);
    }

    #[test]
    fn test_specified_queries() {
        let mut table = SpecTable::new(2, 2, SpecScope::TileAndComponent);
        table.set_tile_default(1, 4).unwrap();
        table.set_component_default(0, 2).unwrap();
        table.set_tile_component(0, 1, 9).unwrap();
        assert!(table.is_tile_specified(1));
        assert!(!table.is_tile_specified(0));
        assert!(table.is_component_specified(0));
        assert!(!table.is_component_specified(1));
        assert!(table.is_tile_component_specified(0, 1));
        assert!(!table.is_tile_component_specified(1, 1));
    }

    #[test]
    fn test_normalize_uses_fallback_when_cells_remain() {
        let mut table = SpecTable::new(2, 2, SpecScope::TileAndComponent);
        table.set_tile_default(0, 4).unwrap();
        table.normalize_defaults(|| Ok(1)).unwrap();
        assert_eq!(table.default(), Some(&1));
        assert_eq!(table.get(1, 0), Some(&1));
        assert_eq!(table.get(0, 1), Some(&4));
    }

    #[test]
    fn test_normalize_keeps_existing_default() {
        let mut table = SpecTable::with_default(1, 1, SpecScope::TileAndComponent, 3);
        table
            .normalize_defaults(|| Err(ConfigError::InvalidGeometry("unused".into())))
            .unwrap();
        assert_eq!(table.default(), Some(&3));
    }

    #[test]
    fn test_normalize_demotes_tile_default() {
        let mut table = SpecTable::new(2, 2, SpecScope::TileAndComponent);
        table.set_tile_default(0, 4).unwrap();
        table.set_tile_default(1, 6).unwrap();
        table.set_tile_component(0, 1, 8).unwrap();
        table.normalize_defaults(|| Ok(0)).unwrap();

        assert_eq!(table.default(), Some(&4));
        assert_eq!(table.tag(0, 0), SpecTag::Default);
        assert_eq!(table.tag(0, 1), SpecTag::TileComponent);
        assert!(!table.is_tile_specified(0));
        assert_eq!(table.get(0, 0), Some(&4));
        assert_eq!(table.get(0, 1), Some(&8));
        assert_eq!(table.get(1, 1), Some(&6));
    }

    #[test]
    fn test_normalize_demotes_component_default() {
        let mut table = SpecTable::new(2, 2, SpecScope::TileAndComponent);
        table.set_component_default(0, 4).unwrap();
        table.set_component_default(1, 6).unwrap();
        table.set_tile_default(1, 2).unwrap();
        table.normalize_defaults(|| Ok(0)).unwrap();

        assert_eq!(table.default(), Some(&4));
        assert_eq!(table.tag(0, 0), SpecTag::Default);
        assert_eq!(table.tag(1, 0), SpecTag::TileDefault);
        assert!(!table.is_component_specified(0));
        assert_eq!(table.get(0, 1), Some(&6));
        assert_eq!(table.get(1, 0), Some(&2));
    }

    #[test]
    fn test_normalize_demotes_tile_component() {
        let mut table = SpecTable::new(1, 2, SpecScope::TileAndComponent);
        table.set_tile_component(0, 0, 4).unwrap();
        table.set_tile_component(0, 1, 6).unwrap();
        table.normalize_defaults(|| Ok(0)).unwrap();

        assert_eq!(table.default(), Some(&4));
        assert_eq!(table.tag(0, 0), SpecTag::Default);
        assert!(!table.is_tile_component_specified(0, 0));
        assert_eq!(table.get(0, 0), Some(&4));
        assert_eq!(table.get(0, 1), Some(&6));
    }

    #[test]
    fn test_rotate_90() {
        // 3 columns x 2 rows before, 2 columns x 3 rows after.
        let mut table = SpecTable::new(6, 2, SpecScope::TileAndComponent);
        table.set_default(0);
        table.set_tile_default(0, 10).unwrap();
        table.set_tile_default(2, 12).unwrap();
        table.set_tile_component(4, 1, 41).unwrap();
        table.set_component_default(1, 99).unwrap();

        table.rotate_90((2, 3)).unwrap();

        // (bx, by) -> (ax, ay) = (1 - by, bx)
        assert_eq!(table.get(1, 0), Some(&10));
        assert_eq!(table.get(5, 0), Some(&12));
        assert_eq!(table.get(2, 1), Some(&41));
        assert_eq!(table.tag(2, 1), SpecTag::TileComponent);
        assert_eq!(table.get(0, 1), Some(&99));
        assert_eq!(table.get(0, 0), Some(&0));
        assert!(table.rotate_90((4, 4)).is_err());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut table = SpecTable::new(2, 2, SpecScope::TileAndComponent);
        table.set_default(1);
        table.set_tile_component(1, 1, 5).unwrap();
        let copy = table.clone();
        table.set_tile_component(1, 1, 6).unwrap();
        table.set_tile_default(0, 3).unwrap();
        assert_eq!(copy.get(1, 1), Some(&5));
        assert_eq!(copy.get(0, 0), Some(&1));
    }

    #[test]
    fn test_min_max() {
        let mut table = SpecTable::with_default(2, 2, SpecScope::TileAndComponent, 2);
        table.set_tile_component(1, 0, 7).unwrap();
        table.set_component_default(1, 1).unwrap();
        assert_eq!(table.max_value(), Some(&7));
        assert_eq!(table.min_value(), Some(&1));
    }

    fn render<V: std::fmt::Display>(table: &SpecTable<V>) -> Vec<String> {
        table
            .cells()
            .map(|(t, c, v)| match v {
                Some(v) => format!("{t}:{c}={v}/{}", u8::from(table.tag(t, c))),
                None => format!("{t}:{c}=-"),
            })
            .collect()
    }

    #[test]
    fn test_accessors_need_no_clone() {
        let mut table = SpecTable::new(2, 1, SpecScope::TileOnly);
        table.set_tile_default(1, 2.5).unwrap();
        assert_eq!(render(&table), vec!["0:0=-", "1:0=2.5/2"]);
        table.set_default(1.0);
        assert_eq!(render(&table)[0], "0:0=1/0");
    }

    #[test]
    fn test_tag_conversion() {
        assert_eq!(u8::from(SpecTag::TileDefault), 2);
        assert_eq!(SpecTag::try_from(3u8).unwrap(), SpecTag::TileComponent);
        assert!(SpecTag::try_from(4u8).is_err());
    }
}
