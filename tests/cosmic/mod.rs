mod systems;
