use crate::ids::{QueueId, ServerId};

#[derive(Debug, Clone)]
pub struct SimServer {
    id: ServerId,
    connections: u32,
    busy: bool,
    queues_served: Vec<QueueId>,
}

impl SimServer {
    pub fn new(id: ServerId) -> Self {
        Self {
            id,
            connections: 0,
            busy: false,
            queues_served: Vec::new(),
        }
    }

    pub fn id(&self) -> ServerId {
        self.id
    }

    pub fn connections(&self) -> u32 {
        self.connections
    }

    pub(crate) fn increment_connections(&mut self) {
        self.connections += 1;
    }

    pub(crate) fn reset_connections(&mut self) {
        self.connections = 0;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn go_busy(&mut self) {
        self.busy = true;
    }

    pub fn go_idle(&mut self) {
        self.busy = false;
    }

    pub fn add_served_queue(&mut self, queue: QueueId) {
        self.queues_served.push(queue);
    }

    pub fn queues_served(&self) -> &[QueueId] {
        &self.queues_served
    }
}
