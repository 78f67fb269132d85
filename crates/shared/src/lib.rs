mod keymap;

pub use keymap::{Binding, KeyMap};

use serde::{Deserialize, Serialize};

/// Тип входного события
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Press,
    Release,
    Move,
}

/// Входное событие от хоста (мышь/клавиатура)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    pub kind: EventKind,
    /// Позиция курсора в координатах области просмотра
    pub mouse: [f64; 2],
    /// Идентификатор клавиши или кнопки (например "LEFTMOUSE", "CTRL+Z")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl InputEvent {
    pub fn press(key: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            kind: EventKind::Press,
            mouse: [x, y],
            key: Some(key.into()),
        }
    }

    pub fn release(key: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            kind: EventKind::Release,
            mouse: [x, y],
            key: Some(key.into()),
        }
    }

    pub fn mouse_move(x: f64, y: f64) -> Self {
        Self {
            kind: EventKind::Move,
            mouse: [x, y],
            key: None,
        }
    }
}

/// Логическое действие инструмента, не зависящее от раскладки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Основное действие (разрез / штрих / захват виджета)
    Action,
    /// Выбор петли или пути под курсором
    Select,
    /// Переключить принудительное создание нового пути
    New,
    Delete,
    Align,
    ShiftUp,
    ShiftDown,
    CountUp,
    CountDown,
    Rotate,
    Translate,
    Smooth,
    SnapCursor,
    ModeToggle,
    Undo,
    ModalConfirm,
    ModalCancel,
}

impl Action {
    /// Все действия
    pub fn all() -> &'static [Action] {
        &[
            Action::Action,
            Action::Select,
            Action::New,
            Action::Delete,
            Action::Align,
            Action::ShiftUp,
            Action::ShiftDown,
            Action::CountUp,
            Action::CountDown,
            Action::Rotate,
            Action::Translate,
            Action::Smooth,
            Action::SnapCursor,
            Action::ModeToggle,
            Action::Undo,
            Action::ModalConfirm,
            Action::ModalCancel,
        ]
    }
}

/// Итоговая сетка: вершины и четырёхугольные грани
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommittedMesh {
    pub vertices: Vec<[f32; 3]>,
    /// Индексы вершин каждой грани (всегда четыре)
    pub faces: Vec<[u32; 4]>,
}

impl CommittedMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Присоединить другую сетку, сдвинув её индексы
    pub fn append(&mut self, other: CommittedMesh) {
        let base = self.vertices.len() as u32;
        self.vertices.extend(other.vertices);
        self.faces.extend(
            other
                .faces
                .into_iter()
                .map(|f| [f[0] + base, f[1] + base, f[2] + base, f[3] + base]),
        );
    }
}
