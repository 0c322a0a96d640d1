//! Metric registry and the exporter's own metric set.
//!
//! The registry maps a name to exactly one metric family. Entries are kept in
//! a `DashMap` and rendered sorted by name so output is deterministic. Each
//! scrape copies one atomic per metric and never waits on the sampler.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use cpuprom_core::error::{CpuPromError, Result};
use cpuprom_core::exposition::{write_counter, write_gauge};
use cpuprom_core::metric::{validate_name, Counter, Gauge, MetricKind};

pub const SAMPLER_UP: &str = "cpuprom_sampler_up";
pub const SAMPLES_TOTAL: &str = "cpuprom_samples_total";
pub const SAMPLE_FAILURES_TOTAL: &str = "cpuprom_sample_failures_total";

#[derive(Clone)]
enum Cell {
    Gauge(Arc<Gauge>),
    Counter(Arc<Counter>),
}

struct Family {
    help: String,
    cell: Cell,
}

#[derive(Default)]
pub struct Registry {
    map: DashMap<String, Family>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a gauge. Fails if the name is invalid or already taken.
    pub fn register_gauge(&self, name: &str, help: &str) -> Result<Arc<Gauge>> {
        let g = Arc::new(Gauge::default());
        self.register(name, help, Cell::Gauge(Arc::clone(&g)))?;
        Ok(g)
    }

    /// Register a counter. Fails if the name is invalid or already taken.
    pub fn register_counter(&self, name: &str, help: &str) -> Result<Arc<Counter>> {
        let c = Arc::new(Counter::default());
        self.register(name, help, Cell::Counter(Arc::clone(&c)))?;
        Ok(c)
    }

    fn register(&self, name: &str, help: &str, cell: Cell) -> Result<()> {
        validate_name(name)?;
        match self.map.entry(name.to_string()) {
            Entry::Occupied(_) => Err(CpuPromError::DuplicateMetric(name.to_string())),
            Entry::Vacant(v) => {
                v.insert(Family { help: help.to_string(), cell });
                Ok(())
            }
        }
    }

    pub fn kind(&self, name: &str) -> Option<MetricKind> {
        self.map.get(name).map(|f| match f.cell {
            Cell::Gauge(_) => MetricKind::Gauge,
            Cell::Counter(_) => MetricKind::Counter,
        })
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Render every family in text exposition format, sorted by name.
    pub fn render(&self) -> String {
        let mut families: Vec<(String, String, Cell)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().help.clone(), r.value().cell.clone()))
            .collect();
        families.sort_by(|a, b| a.0.cmp(&b.0));

        let mut out = String::new();
        for (name, help, cell) in &families {
            match cell {
                Cell::Gauge(g) => write_gauge(&mut out, name, help, g.get()),
                Cell::Counter(c) => write_counter(&mut out, name, help, c.get()),
            }
        }
        out
    }
}

/// The exporter's metric set: the CPU gauge plus sampler health.
pub struct ExporterMetrics {
    registry: Registry,
    pub cpu_usage: Arc<Gauge>,
    /// 1 while the last measurement succeeded, 0 before the first success and
    /// after any failure.
    pub sampler_up: Arc<Gauge>,
    pub samples: Arc<Counter>,
    pub sample_failures: Arc<Counter>,
}

impl ExporterMetrics {
    pub fn new(cpu_name: &str, cpu_help: &str) -> Result<Self> {
        let registry = Registry::new();
        let cpu_usage = registry.register_gauge(cpu_name, cpu_help)?;
        let sampler_up = registry.register_gauge(
            SAMPLER_UP,
            "Whether the last CPU measurement succeeded (1) or not (0)",
        )?;
        let samples = registry.register_counter(SAMPLES_TOTAL, "Successful CPU measurements")?;
        let sample_failures =
            registry.register_counter(SAMPLE_FAILURES_TOTAL, "Failed CPU measurements")?;
        Ok(Self {
            registry,
            cpu_usage,
            sampler_up,
            samples,
            sample_failures,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn is_sampler_up(&self) -> bool {
        self.sampler_up.get() >= 1.0
    }

    pub fn render(&self) -> String {
        self.registry.render()
    }
}
