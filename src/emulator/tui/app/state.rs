use crate::emulator::memory::REGISTER_COUNT;

/// A value that remembers whether it changed since the last [`StateValue::invalidate`].
#[derive(Debug, Default, Clone)]
pub struct StateValue<T> {
    value: T,
    did_change: bool,
}

impl<T: PartialEq> StateValue<T> {
    pub fn set(&mut self, value: T) {
        if self.value == value {
            return;
        }
        self.value = value;
        self.did_change = true;
    }

    pub fn get(&self) -> T
    where
        T: Copy,
    {
        self.value
    }

    pub fn has_changed(&self) -> bool {
        self.did_change
    }

    pub fn invalidate(&mut self) {
        self.did_change = false;
    }
}

/// Machine state shown by the debugger, with changes since the last step marked.
#[derive(Debug, Default, Clone)]
pub struct EmulationState {
    pub registers: [StateValue<u8>; REGISTER_COUNT],
    pub ip: StateValue<usize>,
    pub execution_time: StateValue<u64>,
}

impl EmulationState {
    pub fn invalidate(&mut self) {
        self.registers.iter_mut().for_each(StateValue::invalidate);
        self.ip.invalidate();
        self.execution_time.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_value() {
        let mut value = StateValue::<u8>::default();
        value.set(0);
        assert!(!value.has_changed());
        value.set(3);
        assert!(value.has_changed());
        assert_eq!(value.get(), 3);
        value.invalidate();
        assert!(!value.has_changed());
        assert_eq!(value.get(), 3);
    }

    #[test]
    fn test_invalidate_all() {
        let mut state = EmulationState::default();
        state.registers[7].set(1);
        state.ip.set(2);
        state.invalidate();
        assert!(!state.registers[7].has_changed());
        assert!(!state.ip.has_changed());
    }
}
