use crate::bundle::Bundle;
use crate::catalog::Catalog;
use crate::config::GeneratorConfig;
use crate::error::GenerateError;
use crate::search::Search;
use rand::SeedableRng;
use stldata::PropertySet;

/// Generates empires from one property set.
///
/// The allowed properties are snapshotted at construction; toggle
/// `allowed`/`weight` on the set and build a new generator to pick them up.
pub struct Generator<'a> {
    catalog: Catalog<'a>,
    config: GeneratorConfig,
    rng: rand::rngs::StdRng,
    seed: u64,
}

impl<'a> Generator<'a> {
    pub fn new(properties: &'a PropertySet, config: GeneratorConfig) -> Result<Self, GenerateError> {
        config.validate()?;
        let catalog = Catalog::new(properties);
        if catalog.is_empty() {
            return Err(GenerateError::NoCandidates);
        }
        let seed = config.seed.unwrap_or_else(rand::random);
        log::info!(
            "Generator ready: {} of {} properties allowed, seed {}",
            catalog.len(),
            properties.len(),
            seed
        );
        Ok(Self {
            catalog,
            config,
            rng: rand::rngs::StdRng::seed_from_u64(seed),
            seed,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Runs fresh searches until one yields a bundle or the attempts run out.
    pub fn generate(&mut self) -> Result<Bundle<'a>, GenerateError> {
        let attempts = self.config.max_attempts;
        for attempt in 1..=attempts {
            let mut search = Search::new(&self.catalog, &self.config.quotas);
            let found = search.run(&mut self.rng, self.config.max_steps).is_some();
            let steps = search.steps();
            if let Some(node) = search.current().filter(|_| found) {
                log::debug!("Attempt {}: bundle found after {} steps", attempt, steps);
                if let Some(bundle) = Bundle::from_solution(&self.catalog, node) {
                    return Ok(bundle);
                }
            }
            log::debug!("Attempt {} failed after {} steps", attempt, steps);
        }
        log::info!("Search exhausted after {} attempts", attempts);
        Err(GenerateError::SearchExhausted { attempts })
    }

    /// Generates `count` bundles, stopping at the first failure.
    pub fn generate_many(&mut self, count: usize) -> Result<Vec<Bundle<'a>>, GenerateError> {
        (0..count).map(|_| self.generate()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stldata::{Details, EthicDetails, EthicVariants, Property, Quotas, SpeciesDetails};

    fn species(id: &str, points: i32, max: i32) -> Property {
        Property::new(
            id,
            1,
            Details::Species(SpeciesDetails {
                archetype: "BIOLOGICAL".into(),
                trait_points: points,
                max_traits: max,
                can_be_secondary: true,
            }),
        )
    }

    fn ethic(id: &str, cost: i32) -> Property {
        Property::new(id, cost, Details::Ethics(EthicDetails::default()))
    }

    fn minimal(extra: Vec<Property>) -> PropertySet {
        let mut props = vec![
            Property::new("auth_x", 1, Details::Authority),
            Property::new("civic_a", 1, Details::Civics),
            Property::new("civic_b", 1, Details::Civics),
            Property::new("origin_y", 1, Details::Origin),
        ];
        props.extend(extra);
        PropertySet::new(props, EthicVariants::default())
    }

    fn seeded(seed: u64) -> GeneratorConfig {
        GeneratorConfig {
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_set_has_no_candidates() {
        let set = PropertySet::default();
        assert_eq!(
            Generator::new(&set, GeneratorConfig::default()).err(),
            Some(GenerateError::NoCandidates)
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let set = minimal(vec![]);
        let config = GeneratorConfig {
            max_steps: 0,
            ..Default::default()
        };
        assert!(matches!(
            Generator::new(&set, config),
            Err(GenerateError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_unbalanceable_species_exhausts() {
        // 2 points to spend but no traits at all
        let set = minimal(vec![ethic("ethic_e", 3), species("species_z", 2, 1)]);
        let config = GeneratorConfig {
            max_attempts: 3,
            ..seeded(5)
        };
        let mut generator = Generator::new(&set, config).unwrap();
        assert_eq!(
            generator.generate().err(),
            Some(GenerateError::SearchExhausted { attempts: 3 })
        );
    }

    #[test]
    fn test_generate_returns_solved_node() {
        let set = minimal(vec![ethic("ethic_e", 3), species("species_z", 0, 0)]);
        let mut generator = Generator::new(&set, seeded(0)).unwrap();
        let bundle = generator.generate().unwrap();
        let mut ids = bundle.identifiers();
        ids.sort();
        assert_eq!(
            ids,
            vec!["auth_x", "civic_a", "civic_b", "ethic_e", "origin_y", "species_z"]
        );
    }

    #[test]
    fn test_split_ethics_always_both_chosen() {
        let set = minimal(vec![
            ethic("ethic_one", 1),
            ethic("ethic_two", 2),
            species("species_z", 0, 0),
        ]);
        for seed in 0..20 {
            let mut generator = Generator::new(&set, seeded(seed)).unwrap();
            let bundle = generator.generate().unwrap();
            assert_eq!(bundle.ethics.len(), 2, "seed {}", seed);
            assert_eq!(bundle.ethic_points(), 3);
        }
    }

    #[test]
    fn test_seed_makes_runs_reproducible() {
        let set = minimal(vec![
            ethic("ethic_one", 1),
            ethic("ethic_two", 2),
            ethic("ethic_three", 3),
            species("species_z", 0, 0),
            species("species_w", 0, 0),
        ]);
        let run = |seed| {
            let mut generator = Generator::new(&set, seeded(seed)).unwrap();
            generator
                .generate_many(5)
                .unwrap()
                .iter()
                .map(|b| b.identifiers().join(" "))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(11), run(11));
    }

    #[test]
    fn test_custom_quotas() {
        let set = minimal(vec![ethic("ethic_one", 1), species("species_z", 0, 0)]);
        let config = GeneratorConfig {
            quotas: Quotas {
                max_civics: 1,
                max_ethic_points: 1,
            },
            ..seeded(2)
        };
        let mut generator = Generator::new(&set, config).unwrap();
        let bundle = generator.generate().unwrap();
        assert_eq!(bundle.civics.len(), 1);
        assert_eq!(bundle.ethic_points(), 1);
    }
}
