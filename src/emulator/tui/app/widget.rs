/// Panel that receives the navigation keys.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub enum AppWidget {
    #[default]
    Source,
    Memory,
    Output,
}

impl AppWidget {
    pub fn next(&self) -> AppWidget {
        match self {
            AppWidget::Source => AppWidget::Memory,
            AppWidget::Memory => AppWidget::Output,
            AppWidget::Output => AppWidget::Output, // Don't wrap
        }
    }

    pub fn prev(&self) -> AppWidget {
        match self {
            AppWidget::Source => AppWidget::Source, // Don't wrap
            AppWidget::Memory => AppWidget::Source,
            AppWidget::Output => AppWidget::Memory,
        }
    }
}
