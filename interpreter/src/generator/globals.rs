use super::Generator;
use crate::context::{Context, FrameId};
use crate::datatype::{Period, PeriodUnit, Time};
use crate::lang::RuntimeMsg;

/// Outcome of the last file command.
#[derive(Debug, Default)]
pub struct Success;

impl Generator<bool> for Success {
    fn value(&mut self, ctx: &mut Context) -> Result<bool, RuntimeMsg> {
        Ok(ctx.success)
    }
}

/// Current date and clock, read on every evaluation.
#[derive(Debug, Default)]
pub struct Now;

impl Generator<Time> for Now {
    fn value(&mut self, _ctx: &mut Context) -> Result<Time, RuntimeMsg> {
        Ok(Time::now())
    }
}

/// Current date shifted by a number of days (`yesterday`, `today`, `tomorrow`).
#[derive(Debug)]
pub struct Today {
    offset: i64,
}

impl Today {
    pub fn new(offset: i64) -> Self {
        Self { offset }
    }
}

impl Generator<Time> for Today {
    fn value(&mut self, _ctx: &mut Context) -> Result<Time, RuntimeMsg> {
        let mut t = Time::today();
        if self.offset != 0 {
            t.add_period(&Period::new(self.offset, PeriodUnit::Days));
        }
        Ok(t)
    }
}

/// Path of a location frame (`location` variable).
#[derive(Debug)]
pub struct Location {
    frame: FrameId,
}

impl Location {
    pub fn new(frame: FrameId) -> Self {
        Self { frame }
    }
}

impl Generator<String> for Location {
    fn value(&mut self, ctx: &mut Context) -> Result<String, RuntimeMsg> {
        Ok(ctx.location(self.frame).to_string())
    }
}
