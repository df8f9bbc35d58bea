//! A minimal [`ScheduleModel`] backed by a loaded manifest, wiring the
//! scheduler into a demonstration CLI the way a real backend would wire it
//! into a compiler pipeline.

use std::convert::Infallible;

use dagsched::{EventId, ScheduleModel, StreamId};
use dagsched_core::graph::{IRef, Operator, Program};

use crate::manifest::ScheduleManifest;

/// One emitted hook call, in the order the scheduler produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Sched { ins: IRef, stream: StreamId },
    Record { producer: IRef, event: EventId },
    Wait { consumer: IRef, event: EventId },
}

/// A `ScheduleModel` that does no actual codegen: `weight` reads the
/// manifest's table, and `sched`/`record`/`wait` simply log the call for
/// the CLI to print afterward.
pub struct ConfiguredModel<'a> {
    manifest: &'a ScheduleManifest,
    pub calls: Vec<Call>,
}

impl<'a> ConfiguredModel<'a> {
    pub fn new(manifest: &'a ScheduleManifest) -> Self {
        Self {
            manifest,
            calls: Vec::new(),
        }
    }
}

impl ScheduleModel for ConfiguredModel<'_> {
    type Error = Infallible;

    fn concurrency(&self) -> usize {
        self.manifest.schedule.concurrency
    }

    fn weight(&mut self, op: &Operator) -> Result<u64, Self::Error> {
        Ok(self.manifest.weight_of(op.name()))
    }

    fn sched(&mut self, _program: &mut Program, ins: IRef, stream: StreamId) -> Result<(), Self::Error> {
        self.calls.push(Call::Sched { ins, stream });
        Ok(())
    }

    fn record(&mut self, _program: &mut Program, producer: IRef, event: EventId) -> Result<(), Self::Error> {
        self.calls.push(Call::Record { producer, event });
        Ok(())
    }

    fn wait(&mut self, _program: &mut Program, consumer: IRef, event: EventId) -> Result<(), Self::Error> {
        self.calls.push(Call::Wait { consumer, event });
        Ok(())
    }
}
