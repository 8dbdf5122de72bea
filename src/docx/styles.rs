use docx_rs::*;

fn heading_style(level: usize, size: usize) -> Style {
    Style::new(format!("Heading{level}"), StyleType::Paragraph)
        .name(format!("Heading {level}"))
        .size(size)
        .bold()
}

/// Style id used for a heading level. Level 0 is the document title.
pub fn heading_style_id(level: u8) -> &'static str {
    match level {
        0 => "Title",
        1 => "Heading1",
        2 => "Heading2",
        3 => "Heading3",
        4 => "Heading4",
        5 => "Heading5",
        _ => "Heading6",
    }
}

/// Add every paragraph style the writer refers to.
pub fn add_styles(docx: Docx) -> Docx {
    // Sizes are in half-points.
    let title = Style::new("Title", StyleType::Paragraph)
        .name("Title")
        .size(52)
        .bold()
        .align(AlignmentType::Center);

    let subtitle = Style::new("Subtitle", StyleType::Paragraph)
        .name("Subtitle")
        .size(28)
        .italic()
        .align(AlignmentType::Center);

    let quote = Style::new("Quote", StyleType::Paragraph)
        .name("Quote")
        .indent(Some(720), None, None, None)
        .italic();

    let caption = Style::new("Caption", StyleType::Paragraph)
        .name("Caption")
        .italic()
        .size(18)
        .align(AlignmentType::Center);

    docx.add_style(title)
        .add_style(subtitle)
        .add_style(heading_style(1, 32))
        .add_style(heading_style(2, 28))
        .add_style(heading_style(3, 26))
        .add_style(heading_style(4, 24))
        .add_style(heading_style(5, 22))
        .add_style(heading_style(6, 20))
        .add_style(quote)
        .add_style(caption)
}
