use crate::config::JitterRange;
use crate::engines::generation::population::Population;
use crate::error::{AccompanistError, Result};
use crate::types::{FitnessScore, Individual};
use rand::Rng;

/// Roulette wheel selection: index drawn with probability fitness / total.
pub fn roulette_wheel_select<R: Rng>(fitness: &[FitnessScore], rng: &mut R) -> Result<usize> {
    let total = fitness
        .iter()
        .try_fold(0 as FitnessScore, |acc, &score| acc.checked_add(score))
        .ok_or_else(|| {
            AccompanistError::InvalidPopulationState(format!(
                "fitness of {} individuals overflows the selection wheel",
                fitness.len()
            ))
        })?;
    if total == 0 {
        return Err(AccompanistError::InvalidPopulationState(format!(
            "fitness of {} individuals sums to zero; no selection pressure",
            fitness.len()
        )));
    }

    let mut spin = rng.gen_range(0..total);
    for (index, &score) in fitness.iter().enumerate() {
        if spin < score {
            return Ok(index);
        }
        spin -= score;
    }

    // Fallback
    Ok(fitness.len() - 1)
}

/// Number of leading slots an offspring inherits from its first parent.
pub fn crossover_point(len: usize) -> usize {
    (len / 2 + 1).min(len)
}

/// Midpoint splice: slots `0..=len/2` from `first`, the rest from `second`.
pub fn splice(first: &Individual, second: &Individual) -> Result<Individual> {
    if first.len() != second.len() {
        return Err(AccompanistError::InvalidPopulationState(format!(
            "parents differ in length ({} vs {})",
            first.len(),
            second.len()
        )));
    }
    let cut = crossover_point(first.len());
    let chords = first.chords()[..cut]
        .iter()
        .chain(&second.chords()[cut..])
        .copied()
        .collect();
    Ok(Individual::new(chords))
}

/// Breed `count` offspring from roulette-selected parent pairs.
pub fn crossover<R: Rng>(
    population: &Population,
    fitness: &[FitnessScore],
    count: usize,
    rng: &mut R,
) -> Result<Vec<Individual>> {
    if fitness.len() != population.size() {
        return Err(AccompanistError::InvalidPopulationState(format!(
            "{} fitness values for {} individuals",
            fitness.len(),
            population.size()
        )));
    }

    (0..count)
        .map(|_| {
            let first = roulette_wheel_select(fitness, rng)?;
            let second = roulette_wheel_select(fitness, rng)?;
            match (population.get(first), population.get(second)) {
                (Some(a), Some(b)) => splice(a, b),
                _ => Err(AccompanistError::InvalidPopulationState(
                    "selected parent outside population".to_string(),
                )),
            }
        })
        .collect()
}

/// Perturb one chord of one offspring by a per-note delta, then re-sort it.
///
/// Returns the `(offspring, slot)` that changed, or `None` when there is
/// no chord to mutate.
pub fn mutate<R: Rng>(
    offspring: &mut [Individual],
    jitter: JitterRange,
    rng: &mut R,
) -> Result<Option<(usize, usize)>> {
    jitter.validate("mutation_jitter")?;
    if offspring.is_empty() {
        return Ok(None);
    }
    let target = rng.gen_range(0..offspring.len());
    let individual = &mut offspring[target];
    if individual.is_empty() {
        return Ok(None);
    }
    let slot = rng.gen_range(0..individual.len());

    let deltas = [jitter.sample(rng), jitter.sample(rng), jitter.sample(rng)];
    let mutated = individual.chords()[slot].shifted(deltas);
    individual.set_chord(slot, mutated);
    Ok(Some((target, slot)))
}

/// Steady-state replacement: the `count` weakest members are overwritten by
/// the `count` fittest offspring. Leaves the population sorted least fit first
/// apart from the overwritten prefix.
pub fn replace_weakest(
    population: &mut Population,
    fitness: &[FitnessScore],
    offspring: Vec<Individual>,
    offspring_fitness: &[FitnessScore],
    count: usize,
) -> Result<()> {
    if count > offspring.len() {
        return Err(AccompanistError::InsufficientOffspring {
            requested: count,
            available: offspring.len(),
        });
    }
    if offspring_fitness.len() != offspring.len() {
        return Err(AccompanistError::InvalidPopulationState(format!(
            "{} fitness values for {} offspring",
            offspring_fitness.len(),
            offspring.len()
        )));
    }
    if count > population.size() {
        return Err(AccompanistError::InvalidPopulationState(format!(
            "cannot replace {} members of a population of {}",
            count,
            population.size()
        )));
    }

    population.sort_ascending(fitness)?;

    let mut ranked: Vec<(FitnessScore, Individual)> =
        offspring_fitness.iter().copied().zip(offspring).collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0));

    for (index, (_, child)) in ranked.into_iter().take(count).enumerate() {
        population.replace(index, child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Chord;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tagged(tag: i32, len: usize) -> Individual {
        Individual::new(vec![Chord::new([tag, tag + 4, tag + 7]); len])
    }

    #[test]
    fn test_roulette_zero_sum_fails() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            roulette_wheel_select(&[0, 0, 0], &mut rng),
            Err(AccompanistError::InvalidPopulationState(_))
        ));
        assert!(roulette_wheel_select(&[], &mut rng).is_err());
    }

    #[test]
    fn test_roulette_overflowing_sum_fails() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            roulette_wheel_select(&[u64::MAX, 1], &mut rng),
            Err(AccompanistError::InvalidPopulationState(_))
        ));
    }

    #[test]
    fn test_roulette_never_picks_zero_weight() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..1000 {
            let index = roulette_wheel_select(&[0, 4, 0, 1], &mut rng).unwrap();
            assert!(index == 1 || index == 3);
        }
    }

    #[test]
    fn test_crossover_point() {
        assert_eq!(crossover_point(0), 0);
        assert_eq!(crossover_point(1), 1);
        assert_eq!(crossover_point(4), 3);
        assert_eq!(crossover_point(5), 3);
    }

    #[test]
    fn test_splice_midpoint() {
        let child = splice(&tagged(10, 5), &tagged(20, 5)).unwrap();
        let lows: Vec<i32> = child.chords().iter().map(|c| c.lowest()).collect();
        assert_eq!(lows, vec![10, 10, 10, 20, 20]);
    }

    #[test]
    fn test_splice_length_mismatch() {
        assert!(splice(&tagged(10, 3), &tagged(20, 4)).is_err());
    }

    #[test]
    fn test_mutate_empty_offspring() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(mutate(&mut [], JitterRange::new(-2, 5), &mut rng).unwrap(), None);
        let mut empty = vec![Individual::default()];
        assert_eq!(mutate(&mut empty, JitterRange::new(-2, 5), &mut rng).unwrap(), None);
    }

    #[test]
    fn test_mutate_inverted_range_fails() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut offspring = vec![tagged(40, 3)];
        assert!(matches!(
            mutate(&mut offspring, JitterRange::new(5, -2), &mut rng),
            Err(AccompanistError::Configuration(_))
        ));
        assert_eq!(offspring[0], tagged(40, 3));
    }

    #[test]
    fn test_replace_more_than_offspring_fails() {
        let mut population = Population::new((0..10).map(|i| tagged(i, 2)).collect());
        let fitness = vec![1; 10];
        let result = replace_weakest(&mut population, &fitness, vec![tagged(50, 2)], &[9], 2);
        assert!(matches!(
            result,
            Err(AccompanistError::InsufficientOffspring {
                requested: 2,
                available: 1
            })
        ));
    }
}
