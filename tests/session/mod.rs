mod lock_busy;
