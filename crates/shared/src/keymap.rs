use crate::Action;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Физическая привязка: строка клавиши/кнопки с модификаторами ("CTRL+Z")
pub type Binding = String;

/// Таблица соответствия логических действий и физических привязок
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMap {
    pub bindings: BTreeMap<Action, Vec<Binding>>,
}

impl Default for KeyMap {
    fn default() -> Self {
        let table: &[(Action, &[&str])] = &[
            (Action::Action, &["LEFTMOUSE"]),
            (Action::Select, &["RIGHTMOUSE"]),
            (Action::New, &["N"]),
            (Action::Delete, &["X", "DEL"]),
            (Action::Align, &["SHIFT+A"]),
            (Action::ShiftUp, &["LEFT_ARROW"]),
            (Action::ShiftDown, &["RIGHT_ARROW"]),
            (Action::CountUp, &["NUMPAD_PLUS", "CTRL+WHEELUPMOUSE"]),
            (Action::CountDown, &["NUMPAD_MINUS", "CTRL+WHEELDOWNMOUSE"]),
            (Action::Rotate, &["R"]),
            (Action::Translate, &["G"]),
            (Action::Smooth, &["CTRL+S"]),
            (Action::SnapCursor, &["SHIFT+S"]),
            (Action::ModeToggle, &["TAB"]),
            (Action::Undo, &["CTRL+Z"]),
            (Action::ModalConfirm, &["RET", "NUMPAD_ENTER"]),
            (Action::ModalCancel, &["ESC"]),
        ];

        let bindings = table
            .iter()
            .map(|(action, keys)| (*action, keys.iter().map(|k| k.to_string()).collect()))
            .collect();

        Self { bindings }
    }
}

impl KeyMap {
    /// Привязана ли клавиша к действию
    pub fn is(&self, action: Action, key: &str) -> bool {
        self.bindings
            .get(&action)
            .is_some_and(|keys| keys.iter().any(|k| k.eq_ignore_ascii_case(key)))
    }

    /// Все действия, привязанные к клавише (в порядке `Action`)
    pub fn actions_for(&self, key: &str) -> Vec<Action> {
        self.bindings
            .iter()
            .filter(|(_, keys)| keys.iter().any(|k| k.eq_ignore_ascii_case(key)))
            .map(|(action, _)| *action)
            .collect()
    }

    /// Заменить привязки действия
    pub fn bind(&mut self, action: Action, keys: Vec<Binding>) {
        self.bindings.insert(action, keys);
    }

    /// Действия без единой привязки
    pub fn unbound(&self) -> Vec<Action> {
        Action::all()
            .iter()
            .copied()
            .filter(|a| self.bindings.get(a).is_none_or(|k| k.is_empty()))
            .collect()
    }
}
