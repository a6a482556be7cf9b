use super::evolution_engine::{GenerationStats, ProgressCallback};

/// Reports each generation through the `log` facade.
pub struct ConsoleProgressCallback;

impl ProgressCallback for ConsoleProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        log::debug!("Generation {} starting...", generation + 1);
    }

    fn on_generation_complete(&mut self, stats: &GenerationStats) {
        log::info!(
            "Generation {} complete. Best fitness: {}, mean fitness: {:.1}",
            stats.generation + 1,
            stats.best_fitness,
            stats.mean_fitness
        );
    }
}

pub struct SilentProgressCallback;

impl ProgressCallback for SilentProgressCallback {
    fn on_generation_start(&mut self, _generation: usize) {}

    fn on_generation_complete(&mut self, _stats: &GenerationStats) {}
}

/// Keeps every generation's stats, mostly for tests.
#[derive(Default)]
pub struct RecordingProgressCallback {
    pub started: Vec<usize>,
    pub completed: Vec<GenerationStats>,
}

impl ProgressCallback for &mut RecordingProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        self.started.push(generation);
    }

    fn on_generation_complete(&mut self, stats: &GenerationStats) {
        self.completed.push(stats.clone());
    }
}
