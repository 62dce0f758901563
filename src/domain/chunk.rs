/// A contiguous run of document pages submitted to one completion call.
///
/// Page numbers are 1-based and inclusive on both ends. The text carries a
/// literal `[PAGE:n]` marker before each page so extracted fields can cite
/// their source pages downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct PageChunk {
    pub start_page: u32,
    pub end_page: u32,
    pub text: String,
}

impl PageChunk {
    pub fn new(start_page: u32, end_page: u32, text: String) -> Self {
        Self {
            start_page,
            end_page,
            text,
        }
    }

    /// Dedup key within one extraction run.
    pub fn page_range(&self) -> String {
        format!("{}-{}", self.start_page, self.end_page)
    }

    pub fn page_count(&self) -> u32 {
        self.end_page - self.start_page + 1
    }
}
