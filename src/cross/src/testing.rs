//! A backend that records what the passes ask of it.

use std::collections::HashMap;

use crate::*;

#[derive(Debug, Default)]
pub(crate) struct Recorder {
    pub(crate) names: HashMap<u32, String>,
    pub(crate) column_major: Vec<(u32, u32)>,
    pub(crate) row_major_cleared: Vec<(u32, u32)>,
    /// Pairs returned from `combine_samplers`.
    pub(crate) combined: Vec<CombinedSampler>,
    pub(crate) emitted: bool,
}

impl Recorder {
    pub(crate) fn name(&self, id: u32) -> Option<&str> {
        self.names.get(&id).map(|name| &name[..])
    }
}

impl Annotate for Recorder {
    fn name_of(&mut self, id: u32) -> Result<String> {
        Ok(self.names.get(&id).cloned().unwrap_or_default())
    }

    fn rename(&mut self, id: u32, name: &str) -> Result<()> {
        self.names.insert(id, name.to_owned());
        Ok(())
    }

    fn set_column_major(&mut self, struct_id: u32, member: u32) -> Result<()> {
        self.column_major.push((struct_id, member));
        Ok(())
    }

    fn clear_row_major(&mut self, struct_id: u32, member: u32) -> Result<()> {
        self.row_major_cleared.push((struct_id, member));
        Ok(())
    }
}

impl Backend for Recorder {
    fn combine_samplers(&mut self) -> Result<Vec<CombinedSampler>> {
        Ok(self.combined.clone())
    }

    fn emit_source(&mut self) -> Result<String> {
        self.emitted = true;
        Ok(String::new())
    }
}
