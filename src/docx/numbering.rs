use docx_rs::*;

/// Hands out list numbering definitions.
///
/// Every run of list items gets its own definition so ordered lists restart
/// at 1 after they are interrupted.
#[derive(Clone, Debug)]
pub struct DocxNumbering {
    next_id: usize,
}

impl Default for DocxNumbering {
    fn default() -> Self {
        Self { next_id: 1 }
    }
}

impl DocxNumbering {
    pub fn new() -> Self {
        Self::default()
    }

    fn list_level(ordered: bool) -> Level {
        let (format, text, hanging) = if ordered {
            ("decimal", "%1.", 420)
        } else {
            ("bullet", "•", 360)
        };

        Level::new(
            0,
            Start::new(1),
            NumberFormat::new(format),
            LevelText::new(text),
            LevelJc::new("left"),
        )
        .indent(
            Some(720),
            Some(SpecialIndentType::Hanging(hanging)),
            None,
            None,
        )
    }

    /// Register a new list definition and return its numbering id.
    pub fn create(&mut self, docx: Docx, ordered: bool) -> (Docx, usize) {
        let id = self.next_id;
        self.next_id += 1;

        let docx = docx
            .add_abstract_numbering(AbstractNumbering::new(id).add_level(Self::list_level(ordered)))
            .add_numbering(Numbering::new(id, id));

        (docx, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_list_run_gets_a_fresh_id() {
        let mut numbering = DocxNumbering::default();
        let (docx, first) = numbering.create(Docx::new(), true);
        let (_, second) = numbering.create(docx, true);
        assert_eq!((first, second), (1, 2));
    }
}
