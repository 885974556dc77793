use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use tracing::{debug, warn};

use crate::constants::{COMPONENT_TRANSFORM_VALUES, MCT_COMPONENT_COUNT, OPT_COMPONENT_TRANSFORM};
use crate::error::{ConfigError, ContractViolation, Error};

use super::filters::{FilterKindSource, WaveletFilter};
use super::options::tokenize;
use super::table::{SpecScope, SpecTable, SpecTarget};
use super::typed::parse_allowed;

/// Multiple component transform applied to the three leading components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ComponentTransform {
    #[default]
    None = 0,
    /// Reversible component transform, pairs with the 5/3 filter.
    Rct = 1,
    /// Irreversible component transform, pairs with the 9/7 filter.
    Ict = 2,
}

impl ComponentTransform {
    /// Transform matching a filter bank.
    pub fn for_filter(filter: WaveletFilter) -> Self {
        match filter {
            WaveletFilter::W5x3 => ComponentTransform::Rct,
            WaveletFilter::W9x7 => ComponentTransform::Ict,
        }
    }
}

impl fmt::Display for ComponentTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentTransform::None => write!(f, "none"),
            ComponentTransform::Rct => write!(f, "RCT"),
            ComponentTransform::Ict => write!(f, "ICT"),
        }
    }
}

/// Component transform chosen for each tile.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentTransformSpec {
    table: SpecTable<ComponentTransform>,
}

/// Transform suggested by the filters of the leading components of a tile.
/// Disagreeing filters rule out any transform.
fn filter_choice<F: FilterKindSource>(
    filters: &F,
    tile: usize,
) -> Result<Option<ComponentTransform>, ContractViolation> {
    let lead = filters.filter(tile, 0)?;
    for c in 1..MCT_COMPONENT_COUNT {
        if filters.filter(tile, c)? != lead {
            return Ok(None);
        }
    }
    Ok(Some(ComponentTransform::for_filter(lead)))
}

impl ComponentTransformSpec {
    pub fn parse<F: FilterKindSource>(
        num_tiles: usize,
        num_components: usize,
        text: Option<&str>,
        lossless: bool,
        filters: &F,
    ) -> Result<Self, Error> {
        let mut table = SpecTable::new(num_tiles, num_components, SpecScope::TileOnly);
        let mut explicit = vec![false; num_tiles];

        if let Some(text) = text {
            for entry in tokenize(
                OPT_COMPONENT_TRANSFORM,
                text,
                num_tiles,
                num_components,
                SpecScope::TileOnly,
            )? {
                let value =
                    parse_allowed(OPT_COMPONENT_TRANSFORM, &entry.value, &COMPONENT_TRANSFORM_VALUES)?;
                let tiles: Vec<usize> = match &entry.target {
                    SpecTarget::Tiles(set) => set.iter().collect(),
                    _ => (0..num_tiles).collect(),
                };
                for &t in &tiles {
                    explicit[t] = true;
                }

                if value == "off" {
                    table.apply(&entry.target, ComponentTransform::None)?;
                    continue;
                }
                if num_components < MCT_COMPONENT_COUNT {
                    return Err(ConfigError::TooFewComponents {
                        components: num_components,
                    }
                    .into());
                }
                if lossless {
                    for &t in &tiles {
                        if filter_choice(filters, t)?.is_none() {
                            return Err(ConfigError::MixedFilters { tile: t }.into());
                        }
                    }
                    table.apply(&entry.target, ComponentTransform::Rct)?;
                    continue;
                }
                if entry.target == SpecTarget::Default {
                    let choice = filter_choice(filters, 0)?
                        .ok_or(ConfigError::MixedFilters { tile: 0 })?;
                    table.set_default(choice);
                }
                for t in tiles {
                    let choice =
                        filter_choice(filters, t)?.ok_or(ConfigError::MixedFilters { tile: t })?;
                    table.set_tile_default(t, choice)?;
                }
            }
        } else if num_components < MCT_COMPONENT_COUNT {
            table.set_default(ComponentTransform::None);
        } else if lossless {
            table.set_default(ComponentTransform::Rct);
        } else {
            for t in 0..num_tiles {
                let choice = filter_choice(filters, t)?.unwrap_or(ComponentTransform::None);
                table.set_tile_default(t, choice)?;
            }
        }

        if table.default().is_none() {
            table.set_default(ComponentTransform::None);
            if num_components >= MCT_COMPONENT_COUNT {
                for t in 0..num_tiles {
                    if !table.is_tile_specified(t) {
                        let choice = filter_choice(filters, t)?.unwrap_or(ComponentTransform::None);
                        table.set_tile_default(t, choice)?;
                    }
                }
            }
        }

        if num_components >= MCT_COMPONENT_COUNT {
            for t in 0..num_tiles {
                let transform = *table.resolve("component transform", t, 0)?;
                if transform == ComponentTransform::None {
                    continue;
                }
                let choice = filter_choice(filters, t)?;
                if choice == Some(transform) {
                    continue;
                }
                if explicit[t] {
                    return Err(match choice {
                        Some(_) => ConfigError::TransformFilterMismatch {
                            tile: t,
                            transform,
                            filter: filters.filter(t, 0)?,
                        },
                        None => ConfigError::MixedFilters { tile: t },
                    }
                    .into());
                }
                let corrected = choice.unwrap_or(ComponentTransform::None);
                warn!(tile = t, %transform, %corrected, "correcting component transform");
                table.set_tile_default(t, corrected)?;
            }
        }

        debug!(num_tiles, num_components, "resolved component transforms");
        Ok(Self { table })
    }

    pub fn get(&self, tile: usize) -> Result<ComponentTransform, ContractViolation> {
        self.table.resolve("component transform", tile, 0).copied()
    }

    pub fn table(&self) -> &SpecTable<ComponentTransform> {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Filter bank per tile and component.
    struct Filters(Vec<Vec<WaveletFilter>>);

    impl FilterKindSource for Filters {
        fn filter(&self, t: usize, c: usize) -> Result<WaveletFilter, ContractViolation> {
            Ok(self.0[t][c])
        }
    }

    use WaveletFilter::{W5x3, W9x7};

    #[test]
    fn test_too_few_components() {
        let filters = Filters(vec![vec![W5x3, W5x3]]);
        let spec = ComponentTransformSpec::parse(1, 2, None, true, &filters).unwrap();
        assert_eq!(spec.get(0).unwrap(), ComponentTransform::None);

        let err = ComponentTransformSpec::parse(1, 2, Some("on"), false, &filters).unwrap_err();
        assert_eq!(
            err,
            Error::Config(ConfigError::TooFewComponents { components: 2 })
        );
    }

    #[test]
    fn test_implicit_follows_filters() {
        let filters = Filters(vec![
            vec![W5x3, W5x3, W5x3],
            vec![W9x7, W9x7, W9x7],
            vec![W9x7, W5x3, W9x7],
        ]);
        let spec = ComponentTransformSpec::parse(3, 3, None, false, &filters).unwrap();
        assert_eq!(spec.get(0).unwrap(), ComponentTransform::Rct);
        assert_eq!(spec.get(1).unwrap(), ComponentTransform::Ict);
        assert_eq!(spec.get(2).unwrap(), ComponentTransform::None);
    }

    #[test]
    fn test_lossless_defaults_to_rct() {
        let filters = Filters(vec![vec![W5x3; 3]; 2]);
        let spec = ComponentTransformSpec::parse(2, 3, None, true, &filters).unwrap();
        assert_eq!(spec.get(1).unwrap(), ComponentTransform::Rct);
    }

    #[test]
    fn test_explicit_on_off() {
        let filters = Filters(vec![vec![W9x7; 3], vec![W5x3; 3]]);
        let spec = ComponentTransformSpec::parse(2, 3, Some("on t1 off"), false, &filters).unwrap();
        assert_eq!(spec.get(0).unwrap(), ComponentTransform::Ict);
        assert_eq!(spec.get(1).unwrap(), ComponentTransform::None);

        let spec = ComponentTransformSpec::parse(2, 3, Some("t1 on"), false, &filters).unwrap();
        assert_eq!(spec.get(1).unwrap(), ComponentTransform::Rct);
        assert_eq!(spec.get(0).unwrap(), ComponentTransform::Ict);
    }

    #[test]
    fn test_explicit_on_with_mixed_filters() {
        let filters = Filters(vec![vec![W9x7, W5x3, W9x7]]);
        let err = ComponentTransformSpec::parse(1, 3, Some("on"), false, &filters).unwrap_err();
        assert_eq!(err, Error::Config(ConfigError::MixedFilters { tile: 0 }));
    }

    #[test]
    fn test_explicit_conflict_is_an_error() {
        // Lossless forces RCT, which cannot run on a 9/7 tile.
        let filters = Filters(vec![vec![W9x7; 3]]);
        let err = ComponentTransformSpec::parse(1, 3, Some("t0 on"), true, &filters).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::TransformFilterMismatch {
                tile: 0,
                transform: ComponentTransform::Rct,
                filter: WaveletFilter::W9x7
            })
        ));
    }

    #[test]
    fn test_implicit_conflict_is_corrected() {
        let filters = Filters(vec![vec![W9x7; 3]]);
        let spec = ComponentTransformSpec::parse(1, 3, None, true, &filters).unwrap();
        assert_eq!(spec.get(0).unwrap(), ComponentTransform::Ict);
    }

    #[test]
    fn test_component_scope_rejected() {
        let filters = Filters(vec![vec![W5x3; 3]]);
        assert!(matches!(
            ComponentTransformSpec::parse(1, 3, Some("c0 on"), false, &filters),
            Err(Error::Config(ConfigError::ScopeNotAllowed { .. }))
        ));
    }

    #[test]
    fn test_lossless_explicit_on_checks_every_leading_filter() {
        let filters = Filters(vec![vec![W5x3, W9x7, W5x3]]);
        let err = ComponentTransformSpec::parse(1, 3, Some("on"), true, &filters).unwrap_err();
        assert_eq!(err, Error::Config(ConfigError::MixedFilters { tile: 0 }));
    }

    #[test]
    fn test_implicit_lossless_with_mixed_filters_is_none() {
        let filters = Filters(vec![vec![W9x7, W9x7, W5x3], vec![W5x3; 3]]);
        let spec = ComponentTransformSpec::parse(2, 3, None, true, &filters).unwrap();
        assert_eq!(spec.get(0).unwrap(), ComponentTransform::None);
        assert_eq!(spec.get(1).unwrap(), ComponentTransform::Rct);
    }
}
