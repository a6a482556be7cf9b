use crate::error::{AccompanistError, Result};
use crate::types::{FitnessScore, Individual};

/// Fixed-size, ordered set of candidate accompaniments.
///
/// Member order is meaningful: fitness vectors are index-aligned with it,
/// and replacement relies on reordering members by fitness.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Population {
    members: Vec<Individual>,
}

impl Population {
    pub fn new(members: Vec<Individual>) -> Self {
        Self { members }
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn get(&self, index: usize) -> Option<&Individual> {
        self.members.get(index)
    }

    /// Swap in `individual` at `index`, returning the member it displaced.
    pub fn replace(&mut self, index: usize, individual: Individual) -> Result<Individual> {
        let size = self.size();
        let slot = self.members.get_mut(index).ok_or_else(|| {
            AccompanistError::InvalidPopulationState(format!(
                "index {} out of range for population of {}",
                index, size
            ))
        })?;
        Ok(std::mem::replace(slot, individual))
    }

    pub fn members(&self) -> &[Individual] {
        &self.members
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Individual> {
        self.members.iter()
    }

    /// Stable reorder, least fit first. Returns the fitness vector in the new order.
    pub fn sort_ascending(&mut self, fitness: &[FitnessScore]) -> Result<Vec<FitnessScore>> {
        self.check_aligned(fitness)?;
        let mut ranked: Vec<(FitnessScore, Individual)> =
            fitness.iter().copied().zip(self.members.drain(..)).collect();
        ranked.sort_by_key(|(score, _)| *score);

        let (sorted_fitness, members): (Vec<_>, Vec<_>) = ranked.into_iter().unzip();
        self.members = members;
        Ok(sorted_fitness)
    }

    /// Index and score of the fittest member; ties go to the lowest index.
    pub fn best(&self, fitness: &[FitnessScore]) -> Result<Option<(usize, FitnessScore)>> {
        self.check_aligned(fitness)?;
        let mut best: Option<(usize, FitnessScore)> = None;
        for (index, &score) in fitness.iter().enumerate() {
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((index, score)),
            }
        }
        Ok(best)
    }

    fn check_aligned(&self, fitness: &[FitnessScore]) -> Result<()> {
        if fitness.len() != self.size() {
            return Err(AccompanistError::InvalidPopulationState(format!(
                "{} fitness values for {} individuals",
                fitness.len(),
                self.size()
            )));
        }
        Ok(())
    }
}

impl From<Vec<Individual>> for Population {
    fn from(members: Vec<Individual>) -> Self {
        Population::new(members)
    }
}

impl<'a> IntoIterator for &'a Population {
    type Item = &'a Individual;
    type IntoIter = std::slice::Iter<'a, Individual>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Chord;

    fn tagged(tag: i32) -> Individual {
        Individual::new(vec![Chord::new([tag, tag, tag])])
    }

    #[test]
    fn test_sort_ascending_is_stable() {
        let mut population = Population::new(vec![tagged(1), tagged(2), tagged(3), tagged(4)]);
        let sorted = population.sort_ascending(&[5, 1, 5, 0]).unwrap();
        assert_eq!(sorted, vec![0, 1, 5, 5]);
        let order: Vec<i32> = population.iter().map(|i| i.chords()[0].lowest()).collect();
        assert_eq!(order, vec![4, 2, 1, 3]);
    }

    #[test]
    fn test_best_prefers_first_seen() {
        let population = Population::new(vec![tagged(1), tagged(2), tagged(3)]);
        assert_eq!(population.best(&[3, 7, 7]).unwrap(), Some((1, 7)));
        assert_eq!(Population::default().best(&[]).unwrap(), None);
    }

    #[test]
    fn test_misaligned_fitness_rejected() {
        let mut population = Population::new(vec![tagged(1)]);
        assert!(matches!(
            population.sort_ascending(&[1, 2]),
            Err(AccompanistError::InvalidPopulationState(_))
        ));
    }

    #[test]
    fn test_replace_returns_previous() {
        let mut population = Population::new(vec![tagged(1), tagged(2)]);
        let old = population.replace(1, tagged(9)).unwrap();
        assert_eq!(old, tagged(2));
        assert_eq!(population.get(1), Some(&tagged(9)));
        assert!(population.replace(2, tagged(0)).is_err());
    }
}
